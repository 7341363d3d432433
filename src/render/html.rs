use crate::report::{Metadata, SampleTable};
use serde::Serialize;

/// Report data embedded next to the chart.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView<'a> {
    pub title: &'a str,
    pub points: usize,
    pub t_first: Option<i64>,
    pub t_last: Option<i64>,
    pub avg_insn: Option<f64>,
    pub avg_data: Option<f64>,
    pub meta: &'a Metadata,
    pub samples: &'a SampleTable,
}

/// Render a self-contained HTML report: the SVG chart inline, data embedded as JSON.
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(svg: &str, view: &ReportView<'_>) -> anyhow::Result<String> {
    // "</script>" inside a string literal would end the script block.
    let json = serde_json::to_string(view)?.replace("</", "<\\/");

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  main { padding: 12px 16px; }
  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .chart svg { max-width: 100%; height: auto; }
  .tables { display: flex; gap: 32px; flex-wrap: wrap; }
  table { border-collapse: collapse; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  .muted { color: #777; font-size: 12px; }
  code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<main>
  <div class="chart">__SVG__</div>

  <div class="tables">
    <section>
      <h3>Preamble</h3>
      <table>
        <thead><tr><th>key</th><th>value</th></tr></thead>
        <tbody id="metaBody"></tbody>
      </table>
    </section>

    <section id="samplesSection" style="display:none;">
      <h3>Sample info</h3>
      <table>
        <thead>
          <tr>
            <th class="num">id</th>
            <th class="num">refs</th>
            <th>location</th>
          </tr>
        </thead>
        <tbody id="samplesBody"></tbody>
      </table>
    </section>
  </div>
</main>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;

function fmtNum(x) {
  if (x === null || x === undefined) return "-";
  return Number.isInteger(x) ? x.toLocaleString("en-US") : x.toFixed(1);
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderSummary() {
  const el = document.getElementById("summary");
  el.innerHTML = `
    <span class="pill"><b>${escapeHtml(DATA.title)}</b></span>
    <span class="pill">points: <b>${DATA.points}</b></span>
    <span class="pill">t: <b>${fmtNum(DATA.t_first)}</b> .. <b>${fmtNum(DATA.t_last)}</b></span>
    <span class="pill">insn avg: <b>${fmtNum(DATA.avg_insn)}</b></span>
    <span class="pill">data avg: <b>${fmtNum(DATA.avg_data)}</b></span>
  `;
}

function renderMeta() {
  const body = document.getElementById("metaBody");
  for (const [key, value] of Object.entries(DATA.meta)) {
    const tr = document.createElement("tr");
    const shown = value === null
      ? '<span class="muted">unreadable</span>'
      : (typeof value === "number" ? fmtNum(value) : `<code>${escapeHtml(value)}</code>`);
    tr.innerHTML = `<td>${escapeHtml(key)}</td><td>${shown}</td>`;
    body.appendChild(tr);
  }
}

function renderSamples() {
  const entries = Object.entries(DATA.samples);
  if (entries.length === 0) return;
  document.getElementById("samplesSection").style.display = "block";
  const body = document.getElementById("samplesBody");
  for (const [id, s] of entries) {
    const tr = document.createElement("tr");
    tr.innerHTML = `
      <td class="num">${escapeHtml(id)}</td>
      <td class="num">${fmtNum(s.refs)}</td>
      <td><code>${escapeHtml(s.loc)}</code></td>
    `;
    body.appendChild(tr);
  }
}

renderSummary();
renderMeta();
renderSamples();
</script>
</body>
</html>
"#;

    Ok(TEMPLATE
        .replace("__TITLE__", &escape_html(view.title))
        .replace("__SVG__", svg)
        .replace("__DATA__", &json))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
