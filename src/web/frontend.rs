//! Embedded HTML/CSS/JS frontend for the dashboard.
//!
//! The page is compiled into the binary as a string constant. It renders the
//! control tree from `/_dash-layout`, reads the callback graph from
//! `/_dash-dependencies`, and posts to `/_dash-update-component` whenever a
//! subscribed control changes. Charts are drawn with plotly.js from its CDN.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>dash country</title>
<script src="https://cdn.plot.ly/plotly-2.35.0.min.js"></script>
<style>
:root {
  --bg: #ffffff;
  --surface: #f6f8fa;
  --border: #d0d7de;
  --text: #1f2328;
  --text-muted: #656d76;
  --accent: #0969da;
  --red: #cf222e;
  --radius: 6px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app {
  max-width: 1200px;
  margin: 0 auto;
  padding: 24px;
}

h1 {
  text-align: center;
  font-size: 28px;
  font-weight: 600;
  margin-bottom: 16px;
}

label {
  display: block;
  color: var(--text-muted);
  margin: 12px 0 4px;
}

select {
  width: 100%;
  padding: 6px 8px;
  margin-bottom: 8px;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  background: var(--surface);
  color: var(--text);
  font: inherit;
}

select[multiple] { min-height: 140px; }

.graph {
  min-height: 450px;
  margin-top: 16px;
  border-top: 1px solid var(--border);
}

.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 10px 16px;
  border-radius: var(--radius);
  background: var(--text);
  color: var(--bg);
  opacity: 0;
  transition: opacity 0.2s;
}
.toast.show { opacity: 1; }
.toast.error { background: var(--red); }
</style>
</head>
<body>
<div class="app" id="app"></div>
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
const values = {};
// Latest request number per output; older responses are dropped.
const latest = {};
let dependencies = [];

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const json = await res.json();
  if (!res.ok) throw new Error(json.error || res.statusText);
  return json;
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

// ---------------------------------------------------------------------------
// Layout rendering
// ---------------------------------------------------------------------------
function render(component) {
  switch (component.type) {
    case 'div': {
      const el = document.createElement('div');
      component.children.forEach(c => el.appendChild(render(c)));
      return el;
    }
    case 'heading': {
      const el = document.createElement('h1');
      el.textContent = component.text;
      return el;
    }
    case 'label': {
      const el = document.createElement('label');
      el.textContent = component.text;
      return el;
    }
    case 'dropdown':
      return renderDropdown(component);
    case 'graph': {
      const el = document.createElement('div');
      el.id = component.id;
      el.className = 'graph';
      return el;
    }
  }
  return document.createElement('div');
}

function renderDropdown(d) {
  const el = document.createElement('select');
  el.id = d.id;
  el.multiple = d.multi;
  const selected = d.multi ? (d.value || []) : [d.value];
  d.options.forEach(o => {
    const opt = document.createElement('option');
    opt.textContent = o.label;
    opt.value = JSON.stringify(o.value);
    opt.selected = selected.some(v => JSON.stringify(v) === opt.value);
    el.appendChild(opt);
  });
  values[d.id] = d.value;
  el.addEventListener('change', () => {
    const picked = Array.from(el.selectedOptions).map(o => JSON.parse(o.value));
    values[d.id] = d.multi ? picked : (picked.length ? picked[0] : null);
    onInputChanged(d.id);
  });
  return el;
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------
async function update(dep) {
  const inputs = {};
  dep.inputs.forEach(id => inputs[id] = values[id]);
  const n = latest[dep.output] = (latest[dep.output] || 0) + 1;
  try {
    const res = await api('POST', '/_dash-update-component', { output: dep.output, inputs });
    if (n !== latest[dep.output]) return;
    Plotly.react(res.output, res.figure.data, res.figure.layout);
  } catch (e) {
    if (n !== latest[dep.output]) return;
    toast('Failed to update ' + dep.output + ': ' + e.message, true);
  }
}

function onInputChanged(id) {
  dependencies.filter(dep => dep.inputs.includes(id)).forEach(update);
}

async function init() {
  try {
    const layout = await api('GET', '/_dash-layout');
    document.getElementById('app').appendChild(render(layout.root));
    dependencies = await api('GET', '/_dash-dependencies');
    dependencies.forEach(update);
  } catch (e) {
    toast('Failed to load dashboard: ' + e.message, true);
  }
}

init();
</script>
</body>
</html>
"##;
