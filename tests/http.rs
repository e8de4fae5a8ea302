use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Subscription {
    id: String,
    name: String,
    price: f64,
    currency: String,
    cycle: String,
}

#[derive(Debug, Deserialize)]
struct Reminder {
    subscription_id: String,
    days_left: i64,
}

#[derive(Debug, Deserialize)]
struct ThemeBody {
    theme: String,
}

#[derive(Debug, Deserialize)]
struct Category {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Summary {
    total_monthly: f64,
    total_yearly: f64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("subtracker_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/summary")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_subtracker"))
        .env("PORT", port.to_string())
        .env("SUBTRACKER_DATA_DIR", unique_data_dir())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn list(client: &Client, base_url: &str, query: &str) -> Vec<Subscription> {
    client
        .get(format!("{base_url}/api/subscriptions{query}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create(client: &Client, base_url: &str, body: serde_json::Value) -> Subscription {
    client
        .post(format!("{base_url}/api/subscriptions"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn remove(client: &Client, base_url: &str, id: &str) {
    client
        .delete(format!("{base_url}/api/subscriptions/{id}"))
        .send()
        .await
        .unwrap();
}

async fn current_theme(client: &Client, base_url: &str) -> String {
    let body: ThemeBody = client
        .get(format!("{base_url}/api/theme"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body.theme
}

#[tokio::test]
async fn http_save_edit_and_delete_subscription() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created: Subscription = client
        .post(format!("{}/api/subscriptions", server.base_url))
        .json(&serde_json::json!({
            "name": "Streaming",
            "price": 120,
            "cycle": "yearly",
            "date": "2030-01-15",
            "category": "Entertainment"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.currency, "EUR");

    let yearly = list(&client, &server.base_url, "?cycle=yearly").await;
    assert!(yearly.iter().any(|sub| sub.id == created.id));
    assert!(yearly.iter().all(|sub| sub.cycle == "yearly"));

    let edited: Subscription = client
        .post(format!("{}/api/subscriptions", server.base_url))
        .json(&serde_json::json!({
            "id": created.id,
            "name": "Streaming Plus",
            "price": 180,
            "cycle": "yearly",
            "date": "2030-01-15",
            "category": "Entertainment"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(edited.id, created.id);

    let all = list(&client, &server.base_url, "").await;
    let matching: Vec<_> = all.iter().filter(|sub| sub.id == created.id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].name, "Streaming Plus");
    assert_eq!(matching[0].price, 180.0);

    let summary: Summary = client
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!((summary.total_yearly - summary.total_monthly * 12.0).abs() < 1e-6);

    let response = client
        .delete(format!("{}/api/subscriptions/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let all = list(&client, &server.base_url, "").await;
    assert!(all.iter().all(|sub| sub.id != created.id));
}

#[tokio::test]
async fn http_rejects_invalid_subscription() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/subscriptions", server.base_url))
        .json(&serde_json::json!({
            "name": "   ",
            "price": 5,
            "cycle": "monthly",
            "date": "2030-01-15"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_import_rejects_bad_documents_and_keeps_store() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server.base_url, "").await;

    let response = client
        .post(format!("{}/api/import", server.base_url))
        .body(r#"{"subscriptions": "not-an-array"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/import", server.base_url))
        .body("definitely not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = list(&client, &server.base_url, "").await;
    assert_eq!(after.len(), before.len());
}

#[tokio::test]
async fn http_export_then_import_restores_list() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/subscriptions", server.base_url))
        .json(&serde_json::json!({
            "name": "Backup me",
            "price": 3.5,
            "cycle": "monthly",
            "date": "2030-02-01",
            "category": "Software"
        }))
        .send()
        .await
        .unwrap();
    let before = list(&client, &server.base_url, "").await;

    let response = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap();
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("subtracker-backup-"));
    let document = response.text().await.unwrap();

    let response = client
        .post(format!("{}/api/import", server.base_url))
        .body(document)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["reload_required"], true);
    assert_eq!(outcome["imported"], before.len());

    let after = list(&client, &server.base_url, "").await;
    let ids = |subs: &[Subscription]| subs.iter().map(|sub| sub.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&after), ids(&before));
}

#[tokio::test]
async fn http_duplicate_category_conflicts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/categories", server.base_url))
        .json(&serde_json::json!({ "name": "entertainment", "color": "#000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn http_malformed_form_is_bad_request() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for body in [
        serde_json::json!({ "name": "Gym", "price": "abc", "cycle": "monthly", "date": "2030-01-15" }),
        serde_json::json!({ "name": "Gym", "price": 5, "cycle": "weekly", "date": "2030-01-15" }),
        serde_json::json!({ "name": "Gym", "price": 5, "cycle": "monthly", "date": "15/01/2030" }),
    ] {
        let response = client
            .post(format!("{}/api/subscriptions", server.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn http_reminders_follow_current_subscriptions() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = chrono::Local::now().date_naive();
    let due = create(
        &client,
        &server.base_url,
        serde_json::json!({
            "name": "Due today",
            "price": 8,
            "cycle": "monthly",
            "date": today.format("%Y-%m-%d").to_string()
        }),
    )
    .await;
    let later = create(
        &client,
        &server.base_url,
        serde_json::json!({
            "name": "Due later",
            "price": 8,
            "cycle": "monthly",
            "date": (today + chrono::Duration::days(3)).format("%Y-%m-%d").to_string()
        }),
    )
    .await;

    let reminders: Vec<Reminder> = client
        .get(format!("{}/api/reminders", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let hit = reminders
        .iter()
        .find(|reminder| reminder.subscription_id == due.id)
        .expect("subscription due today is reminded");
    assert_eq!(hit.days_left, 0);
    assert!(reminders.iter().all(|reminder| reminder.subscription_id != later.id));

    remove(&client, &server.base_url, &due.id).await;
    remove(&client, &server.base_url, &later.id).await;
}

#[tokio::test]
async fn http_theme_defaults_to_dark_and_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    assert_eq!(current_theme(&client, &server.base_url).await, "dark");

    for theme in ["light", "dark"] {
        let response = client
            .put(format!("{}/api/theme", server.base_url))
            .json(&serde_json::json!({ "theme": theme }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(current_theme(&client, &server.base_url).await, theme);
    }
}

#[tokio::test]
async fn http_add_and_delete_category() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let added: Vec<Category> = client
        .post(format!("{}/api/categories", server.base_url))
        .json(&serde_json::json!({ "name": "Gym Stuff", "color": "#123456" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(added.iter().any(|category| category.name == "Gym Stuff"));

    let remaining: Vec<Category> = client
        .delete(format!("{}/api/categories/Gym%20Stuff", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(remaining.iter().all(|category| category.name != "Gym Stuff"));
    assert_eq!(remaining.len(), added.len() - 1);
}

#[tokio::test]
async fn http_list_sorts_by_price() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let cheap = create(
        &client,
        &server.base_url,
        serde_json::json!({ "name": "Cheap", "price": 1, "cycle": "monthly", "date": "2030-03-01" }),
    )
    .await;
    let pricey = create(
        &client,
        &server.base_url,
        serde_json::json!({ "name": "Pricey", "price": 500, "cycle": "yearly", "date": "2030-03-02" }),
    )
    .await;

    let desc = list(&client, &server.base_url, "?sort=price_desc").await;
    assert!(desc.windows(2).all(|pair| pair[0].price >= pair[1].price));
    let asc = list(&client, &server.base_url, "?sort=price_asc").await;
    assert!(asc.windows(2).all(|pair| pair[0].price <= pair[1].price));
    assert_eq!(desc.len(), asc.len());

    remove(&client, &server.base_url, &cheap.id).await;
    remove(&client, &server.base_url, &pricey.id).await;
}
