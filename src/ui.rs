use crate::models::DateRange;

pub fn render_index(range: &DateRange) -> String {
    INDEX_HTML
        .replace("{{START}}", &range.start_str())
        .replace("{{END}}", &range.end_str())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>WHOOP Data Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg: #f3f1ec;
      --ink: #1f2328;
      --muted: #6b6f76;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: #ffffff;
      --line: rgba(47, 72, 88, 0.1);
      --shadow: 0 18px 40px rgba(47, 72, 88, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      grid-template-columns: 260px 1fr;
    }

    aside {
      background: var(--accent-2);
      color: white;
      padding: 32px 22px;
      display: grid;
      align-content: start;
      gap: 18px;
    }

    aside h2 {
      margin: 0;
      font-size: 1.1rem;
      letter-spacing: 0.04em;
    }

    aside label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: rgba(255, 255, 255, 0.75);
    }

    aside input {
      border: none;
      border-radius: 10px;
      padding: 10px 12px;
      font: inherit;
      font-size: 0.95rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: rgba(255, 255, 255, 0.14);
    }

    main {
      padding: 36px 40px 56px;
      display: grid;
      gap: 28px;
      align-content: start;
      min-width: 0;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 6px 0 0;
      color: var(--muted);
    }

    section h2 {
      margin: 0 0 12px;
      font-size: 1.35rem;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      border: 1px solid var(--line);
      box-shadow: var(--shadow);
      padding: 16px;
    }

    .table-wrap {
      overflow-x: auto;
      max-height: 360px;
    }

    table {
      border-collapse: collapse;
      font-size: 0.85rem;
      white-space: nowrap;
    }

    th, td {
      padding: 6px 10px;
      border-bottom: 1px solid var(--line);
      text-align: left;
    }

    th {
      position: sticky;
      top: 0;
      background: var(--card);
      color: var(--accent-2);
    }

    td.missing {
      color: #b3aea6;
      font-style: italic;
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 18px;
    }

    .chart-card h3 {
      margin: 0 0 8px;
      font-size: 1rem;
    }

    .chart-card svg {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-bar {
      fill: var(--accent-2);
      opacity: 0.85;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .empty {
      color: var(--muted);
      margin: 0;
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: #c63b2b;
      font-weight: 600;
    }

    @media (max-width: 800px) {
      body {
        grid-template-columns: 1fr;
      }
      main {
        padding: 24px 18px;
      }
    }
  </style>
</head>
<body>
  <aside>
    <h2>Select Date Range</h2>
    <form id="range-form">
      <label>Start date <input type="date" id="start" value="{{START}}" required /></label>
      <label>End date <input type="date" id="end" value="{{END}}" required /></label>
      <p><button type="submit">Load</button></p>
    </form>
    <button class="secondary" id="refresh" type="button">Refresh from WHOOP</button>
  </aside>

  <main>
    <header>
      <h1>WHOOP Data Dashboard</h1>
      <p class="subtitle">Sleep and workout data for the selected date range.</p>
    </header>

    <div class="status" id="status"></div>

    <div id="content">
      <section>
        <h2>Sleep Data</h2>
        <div class="card table-wrap" id="sleep-table"></div>
      </section>

      <section>
        <h2>Workout Data</h2>
        <div class="card table-wrap" id="workout-table"></div>
      </section>

      <section>
        <h2>Charts</h2>
        <div class="charts" id="charts"></div>
      </section>
    </div>
  </main>

  <script>
    const form = document.getElementById('range-form');
    const startEl = document.getElementById('start');
    const endEl = document.getElementById('end');
    const refreshEl = document.getElementById('refresh');
    const statusEl = document.getElementById('status');
    const contentEl = document.getElementById('content');
    const sleepEl = document.getElementById('sleep-table');
    const workoutEl = document.getElementById('workout-table');
    const chartsEl = document.getElementById('charts');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (value) =>
      String(value)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;');

    const formatCell = (value) => {
      if (value === null || value === undefined) {
        return '<td class="missing">n/a</td>';
      }
      const text = typeof value === 'object' ? JSON.stringify(value) : value;
      return `<td>${escapeHtml(text)}</td>`;
    };

    const renderTable = (el, table, emptyMessage) => {
      if (!table.rows.length) {
        el.innerHTML = `<p class="empty">${emptyMessage}</p>`;
        return;
      }
      const head = table.columns.map((column) => `<th>${escapeHtml(column)}</th>`).join('');
      const body = table.rows
        .map((row) => `<tr>${row.map(formatCell).join('')}</tr>`)
        .join('');
      el.innerHTML = `<table><thead><tr>${head}</tr></thead><tbody>${body}</tbody></table>`;
    };

    const formatAxisValue = (value) => {
      const rounded = Math.round(value * 10) / 10;
      return Number.isInteger(rounded) ? rounded.toString() : rounded.toFixed(1);
    };

    const renderChart = (svg, chart) => {
      const points = chart.points;
      if (!points.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No values in range</text>';
        return;
      }

      const width = 600;
      const height = 260;
      const paddingX = 48;
      const paddingY = 34;
      const top = 20;

      const values = points.map((point) => point.value);
      let min = Math.min(0, ...values);
      let max = Math.max(0, ...values);
      if (min === max) {
        max += 1;
      }

      const range = max - min;
      const slots = chart.kind === 'bar' ? points.length : Math.max(points.length - 1, 1);
      const xStep = (width - paddingX * 2) / slots;
      const scaleY = (height - top - paddingY) / range;
      const x = (index) => paddingX + (chart.kind === 'bar' ? (index + 0.5) * xStep : index * xStep);
      const y = (value) => height - paddingY - (value - min) * scaleY;

      let grid = '';
      const ticks = 4;
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + (range * i) / ticks;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${paddingX - 8}" y="${y(value) + 4}" text-anchor="end">${formatAxisValue(value)}</text>`;
      }

      let marks = '';
      if (chart.kind === 'bar') {
        const barWidth = Math.max(xStep * 0.6, 2);
        marks = points
          .map((point, index) => {
            const top = Math.min(y(point.value), y(0));
            const barHeight = Math.abs(y(point.value) - y(0));
            return `<rect class="chart-bar" x="${x(index) - barWidth / 2}" y="${top}" width="${barWidth}" height="${barHeight}"><title>${point.x}: ${point.value}</title></rect>`;
          })
          .join('');
      } else {
        const path = points
          .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.value).toFixed(2)}`)
          .join(' ');
        const circles = points
          .map((point, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(point.value)}" r="4"><title>${point.x}: ${point.value}</title></circle>`)
          .join('');
        marks = `<path class="chart-line" d="${path}" />${circles}`;
      }

      const labelEvery = Math.ceil(points.length / 8);
      const xLabels = points
        .map((point, index) => (index % labelEvery === 0
          ? `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${point.label}</text>`
          : ''))
        .join('');

      svg.setAttribute('viewBox', `0 0 ${width} ${height}`);
      svg.innerHTML = `${grid}${marks}${xLabels}`;
    };

    const renderCharts = (charts) => {
      if (!charts.length) {
        chartsEl.innerHTML = '<p class="empty">No visualizations available for the selected range.</p>';
        return;
      }
      chartsEl.innerHTML = '';
      charts.forEach((chart) => {
        const card = document.createElement('div');
        card.className = 'card chart-card';
        card.innerHTML = `<h3>${escapeHtml(chart.title)}</h3><svg role="img" aria-label="${escapeHtml(chart.y_label)}"></svg>`;
        chartsEl.appendChild(card);
        renderChart(card.querySelector('svg'), chart);
      });
    };

    const load = async (refresh) => {
      const start = startEl.value;
      const end = endEl.value;
      if (start && end && start > end) {
        contentEl.hidden = true;
        setStatus('Error: End date must fall after start date.', 'error');
        return;
      }

      setStatus(refresh ? 'Refreshing from WHOOP...' : 'Loading...', 'info');
      const params = new URLSearchParams({ start, end });
      if (refresh) {
        params.set('refresh', 'true');
      }

      const res = await fetch(`/api/data?${params}`);
      if (!res.ok) {
        contentEl.hidden = true;
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }

      const data = await res.json();
      contentEl.hidden = false;
      renderTable(sleepEl, data.sleep, 'No sleep data available for the selected range.');
      renderTable(workoutEl, data.workout, 'No workout data available for the selected range.');
      renderCharts(data.charts);
      setStatus(`${data.start} to ${data.end}${data.cached ? ' (cached)' : ''}`, 'ok');
    };

    form.addEventListener('submit', (event) => {
      event.preventDefault();
      load(false).catch((err) => setStatus(err.message, 'error'));
    });

    refreshEl.addEventListener('click', () => {
      load(true).catch((err) => setStatus(err.message, 'error'));
    });

    load(false).catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
