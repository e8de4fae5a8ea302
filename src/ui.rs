use crate::models::{SummaryResponse, Theme};

pub fn render_index(summary: &SummaryResponse, theme: Theme) -> String {
    let theme_class = match theme {
        Theme::Light => "light-theme",
        Theme::Dark => "dark-theme",
    };
    INDEX_HTML
        .replace("{{THEME}}", theme_class)
        .replace("{{MONTHLY}}", &format!("{:.2}", summary.total_monthly))
        .replace("{{YEARLY}}", &format!("{:.2}", summary.total_yearly))
}

/// Offline cache for the page shell: cache-first, network fallback.
pub const SERVICE_WORKER_JS: &str = r#"const CACHE_NAME = 'subtracker-v1';
const ASSETS = ['/', '/sw.js'];

self.addEventListener('install', (event) => {
  event.waitUntil(caches.open(CACHE_NAME).then((cache) => cache.addAll(ASSETS)));
});

self.addEventListener('fetch', (event) => {
  if (event.request.method !== 'GET' || new URL(event.request.url).pathname.startsWith('/api/')) {
    return;
  }
  event.respondWith(
    caches.match(event.request).then((response) => response || fetch(event.request))
  );
});

self.addEventListener('notificationclick', (event) => {
  event.notification.close();
  event.waitUntil(
    clients.matchAll({ type: 'window' }).then((list) => {
      for (const client of list) {
        if ('focus' in client) return client.focus();
      }
      if (clients.openWindow) return clients.openWindow('/');
    })
  );
});
"#;

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Subscription Tracker</title>
  <style>
    :root {
      --bg: #1e1e23;
      --card: #2a2a31;
      --ink: #f1f2f6;
      --muted: #a4b0be;
      --accent: #6c5ce7;
      --danger: #ff7675;
    }

    body.light-theme {
      --bg: #f5f6fa;
      --card: #ffffff;
      --ink: #2d3436;
      --muted: #636e72;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      display: grid;
      gap: 20px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      padding: 20px;
    }

    .totals {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 12px;
    }

    .total-value {
      font-size: 2rem;
      font-weight: 600;
    }

    .muted {
      color: var(--muted);
    }

    .row {
      display: flex;
      gap: 10px;
      flex-wrap: wrap;
      align-items: center;
    }

    .sub-card {
      display: flex;
      justify-content: space-between;
      padding: 12px 0;
      border-bottom: 1px solid rgba(127, 127, 127, 0.2);
      cursor: pointer;
    }

    .legend span {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 8px 14px;
      background: var(--accent);
      color: #fff;
      cursor: pointer;
    }

    button.danger {
      background: var(--danger);
    }

    .hidden {
      display: none;
    }

    #status {
      min-height: 1.2em;
    }
  </style>
</head>
<body class="{{THEME}}">
  <main class="app">
    <header>
      <h1>Subscriptions</h1>
      <div class="row">
        <button id="theme-btn" type="button">Theme</button>
        <button id="add-btn" type="button">Add</button>
      </div>
    </header>

    <section class="card totals">
      <div>
        <div class="muted">Per month</div>
        <div class="total-value" id="total-monthly">{{MONTHLY}}</div>
      </div>
      <div>
        <div class="muted">Per year</div>
        <div class="total-value" id="total-yearly">{{YEARLY}}</div>
      </div>
    </section>

    <section class="card row">
      <svg id="chart" width="180" height="180" viewBox="0 0 42 42"></svg>
      <div id="legend" class="legend"></div>
    </section>

    <section class="card">
      <div class="row">
        <select id="filter-cycle">
          <option value="all">All</option>
          <option value="monthly">Monthly</option>
          <option value="yearly">Yearly</option>
        </select>
        <select id="sort-select">
          <option value="date">Next renewal</option>
          <option value="price_desc">Price (high to low)</option>
          <option value="price_asc">Price (low to high)</option>
          <option value="name">Name</option>
        </select>
      </div>
      <div id="list"></div>
    </section>

    <section class="card hidden" id="editor">
      <form id="sub-form" class="row">
        <input type="hidden" id="sub-id" />
        <input id="sub-name" placeholder="Name" required />
        <input id="sub-price" type="number" step="0.01" min="0" placeholder="Price" required />
        <input id="sub-currency" placeholder="Currency" value="EUR" />
        <select id="sub-cycle">
          <option value="monthly">Monthly</option>
          <option value="yearly">Yearly</option>
        </select>
        <input id="sub-date" type="date" required />
        <select id="sub-category"></select>
        <button type="submit">Save</button>
        <button type="button" id="delete-btn" class="danger hidden">Delete</button>
        <button type="button" id="cancel-btn">Cancel</button>
      </form>
    </section>

    <section class="card">
      <h2>Settings</h2>
      <div id="categories"></div>
      <div class="row">
        <input id="new-cat-name" placeholder="New category" />
        <input id="new-cat-color" type="color" value="#6c5ce7" />
        <button id="add-cat-btn" type="button">Add category</button>
      </div>
      <div class="row">
        <a href="/api/export"><button type="button">Export</button></a>
        <input id="import-file" type="file" accept="application/json" />
      </div>
      <div id="status" class="muted"></div>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const statusEl = $('status');
    let categories = [];

    const setStatus = (message) => {
      statusEl.textContent = message;
    };

    const api = async (path, options = {}) => {
      const res = await fetch(path, options);
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const formatPrice = (price, currency) => {
      try {
        return new Intl.NumberFormat(undefined, { style: 'currency', currency: currency || 'EUR' }).format(price);
      } catch {
        return `${Number(price).toFixed(2)} ${currency || 'EUR'}`;
      }
    };

    const renderChart = (slices) => {
      const svg = $('chart');
      const legend = $('legend');
      const total = slices.reduce((sum, slice) => sum + slice.value, 0) || 1;
      let offset = 25;
      svg.innerHTML = '';
      legend.innerHTML = '';
      slices.forEach((slice) => {
        const share = (slice.value / total) * 100;
        const ring = document.createElementNS('http://www.w3.org/2000/svg', 'circle');
        ring.setAttribute('cx', '21');
        ring.setAttribute('cy', '21');
        ring.setAttribute('r', '15.915');
        ring.setAttribute('fill', 'transparent');
        ring.setAttribute('stroke', slice.color);
        ring.setAttribute('stroke-width', '5');
        ring.setAttribute('stroke-dasharray', `${share} ${100 - share}`);
        ring.setAttribute('stroke-dashoffset', String(offset));
        svg.appendChild(ring);
        offset -= share;

        const item = document.createElement('div');
        const dot = document.createElement('span');
        dot.style.background = slice.color;
        item.appendChild(dot);
        item.appendChild(document.createTextNode(
          slice.placeholder ? slice.label : `${slice.label || '(none)'}: ${slice.value.toFixed(2)}`
        ));
        legend.appendChild(item);
      });
    };

    const loadSummary = async () => {
      try {
        const summary = await api('/api/summary');
        $('total-monthly').textContent = summary.total_monthly.toFixed(2);
        $('total-yearly').textContent = summary.total_yearly.toFixed(2);
        renderChart(summary.slices);
      } catch (err) {
        console.warn('Chart unavailable', err);
      }
    };

    const loadList = async () => {
      const params = new URLSearchParams({ cycle: $('filter-cycle').value, sort: $('sort-select').value });
      const subs = await api(`/api/subscriptions?${params}`);
      const list = $('list');
      list.innerHTML = '';
      if (subs.length === 0) {
        list.innerHTML = '<p class="muted">No subscriptions found.</p>';
        return;
      }
      subs.forEach((sub) => {
        const card = document.createElement('div');
        card.className = 'sub-card';
        const info = document.createElement('div');
        const name = document.createElement('strong');
        name.textContent = sub.name;
        const meta = document.createElement('div');
        meta.className = 'muted';
        meta.textContent = `Renews ${sub.date} · ${sub.cycle}`;
        info.appendChild(name);
        info.appendChild(meta);
        const price = document.createElement('div');
        price.textContent = formatPrice(sub.price, sub.currency);
        card.appendChild(info);
        card.appendChild(price);
        card.addEventListener('click', () => openEditor(sub));
        list.appendChild(card);
      });
    };

    const refresh = () => Promise.all([loadList(), loadSummary()]);

    const renderCategories = () => {
      const select = $('sub-category');
      const current = select.value;
      select.innerHTML = '';
      const container = $('categories');
      container.innerHTML = '';
      categories.forEach((cat) => {
        const option = document.createElement('option');
        option.value = cat.name;
        option.textContent = cat.name;
        select.appendChild(option);

        const row = document.createElement('div');
        row.className = 'row';
        const label = document.createElement('span');
        label.textContent = cat.name;
        label.style.color = cat.color;
        const remove = document.createElement('button');
        remove.type = 'button';
        remove.className = 'danger';
        remove.textContent = 'x';
        remove.addEventListener('click', async () => {
          if (!confirm(`Delete category "${cat.name}"?`)) return;
          categories = await api(`/api/categories/${encodeURIComponent(cat.name)}`, { method: 'DELETE' });
          renderCategories();
        });
        row.appendChild(label);
        row.appendChild(remove);
        container.appendChild(row);
      });
      if (current) select.value = current;
    };

    const loadCategories = async () => {
      categories = await api('/api/categories');
      renderCategories();
    };

    const openEditor = (sub = null) => {
      $('editor').classList.remove('hidden');
      $('sub-form').reset();
      $('sub-id').value = sub ? sub.id : '';
      $('sub-name').value = sub ? sub.name : '';
      $('sub-price').value = sub ? sub.price : '';
      $('sub-currency').value = sub ? sub.currency : 'EUR';
      $('sub-cycle').value = sub ? sub.cycle : 'monthly';
      $('sub-date').value = sub ? sub.date : new Date().toISOString().split('T')[0];
      if (sub) $('sub-category').value = sub.category;
      $('delete-btn').classList.toggle('hidden', !sub);
    };

    const closeEditor = () => $('editor').classList.add('hidden');

    const notifyReminders = async () => {
      const reminders = await api('/api/reminders');
      if (reminders.length === 0) return;
      if (!('Notification' in window)) {
        setStatus('Notifications are not available in this browser.');
        return;
      }
      let permission = Notification.permission;
      if (permission === 'default') {
        permission = await Notification.requestPermission();
      }
      if (permission !== 'granted') {
        setStatus('Please enable notifications to receive renewal reminders.');
        return;
      }
      reminders.forEach((reminder) => new Notification(reminder.title, { body: reminder.body }));
    };

    $('sub-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        await api('/api/subscriptions', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({
            id: $('sub-id').value,
            name: $('sub-name').value,
            price: parseFloat($('sub-price').value),
            currency: $('sub-currency').value,
            cycle: $('sub-cycle').value,
            date: $('sub-date').value,
            category: $('sub-category').value
          })
        });
        closeEditor();
        await refresh();
      } catch (err) {
        setStatus(err.message);
      }
    });

    $('delete-btn').addEventListener('click', async () => {
      if (!confirm('Delete?')) return;
      await api(`/api/subscriptions/${encodeURIComponent($('sub-id').value)}`, { method: 'DELETE' });
      closeEditor();
      await refresh();
    });

    $('cancel-btn').addEventListener('click', closeEditor);
    $('add-btn').addEventListener('click', () => openEditor());
    $('filter-cycle').addEventListener('change', loadList);
    $('sort-select').addEventListener('change', loadList);

    $('theme-btn').addEventListener('click', async () => {
      const light = !document.body.classList.contains('light-theme');
      document.body.classList.toggle('light-theme', light);
      document.body.classList.toggle('dark-theme', !light);
      await api('/api/theme', {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ theme: light ? 'light' : 'dark' })
      });
    });

    $('add-cat-btn').addEventListener('click', async () => {
      const name = $('new-cat-name').value;
      if (!name) return;
      try {
        categories = await api('/api/categories', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ name, color: $('new-cat-color').value })
        });
        $('new-cat-name').value = '';
        renderCategories();
      } catch (err) {
        setStatus(err.message);
      }
    });

    $('import-file').addEventListener('change', async (event) => {
      const file = event.target.files[0];
      if (!file) return;
      try {
        await api('/api/import', { method: 'POST', body: await file.text() });
        alert('Restore complete. The app will reload.');
        window.location.reload();
      } catch (err) {
        setStatus(err.message);
      }
    });

    if ('serviceWorker' in navigator) {
      navigator.serviceWorker.register('/sw.js').catch((err) => console.log('SW failed', err));
    }

    Promise.all([loadCategories(), refresh()])
      .then(notifyReminders)
      .catch((err) => setStatus(err.message));
  </script>
</body>
</html>
"##;
