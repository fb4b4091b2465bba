//! HTML rendering for every page and data fragment.
//!
//! Pages are shells: they render immediately in the loading state and use
//! HTMX to request their data fragment once on load. Maps are drawn with
//! Leaflet and charts with Chart.js, both loaded from a CDN.

use chrono::Datelike;
use serde::Serialize;

use crate::aggregate::{Dashboard, LargestRow, SortOrder};
use crate::models::EventRecord;
use crate::state::LoadState;

const MAP_LOADING: &str = "Loading earthquake data...";
const MAP_EMPTY: &str = "No earthquake data available right now.";
const DASHBOARD_LOADING: &str = "Loading data...";
const DASHBOARD_EMPTY: &str = "No earthquake data available.";
const CHART_EMPTY: &str = "No data available for this chart.";
const TABLE_EMPTY: &str = "No data available.";
const QUAKE_ICON_URL: &str = "https://cdn-icons-png.flaticon.com/512/684/684908.png";

/// Escape text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a value for embedding inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".into())
        .replace('<', "\\u003c")
}

/// Wrap page content in the shared header and footer.
fn layout(title: &str, body: &str) -> String {
    let year = chrono::Local::now().year();
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · Earthquake Visualizer</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>{STYLE}</style>
</head>
<body>
    <header class="header">
        <div class="header-inner">
            <a href="/" class="logo">Earthquake Visualizer</a>
            <button class="menu-toggle" aria-label="Toggle menu" aria-expanded="false"
                onclick="var open = document.getElementById('site-nav').classList.toggle('open'); this.setAttribute('aria-expanded', open);">&#9776;</button>
            <nav class="nav" id="site-nav">
                <a href="/">Home</a>
                <a href="/map">Map</a>
                <a href="/visualize">Visualize</a>
            </nav>
        </div>
    </header>
    <main class="main">
{body}
    </main>
    <footer class="footer">
        <p>&copy; {year} <strong>Earthquake Visualizer</strong> | Powered by
        <a href="https://earthquake.usgs.gov/" target="_blank" rel="noopener noreferrer">USGS API</a></p>
    </footer>
</body>
</html>
"##,
        title = escape_html(title),
    )
}

fn message(class: &str, text: &str) -> String {
    format!(r#"<p class="message {class}">{}</p>"#, escape_html(text))
}

// ============================================================================
// Pages
// ============================================================================

#[must_use]
pub fn landing_page() -> String {
    layout(
        "Home",
        r#"<section class="hero">
    <h1>Track Earthquakes in Real Time</h1>
    <p>Explore recent and historic earthquakes worldwide. Visualize seismic activity
    to understand geographical distribution, frequency, magnitude, depth, and temporal patterns.</p>
</section>
<section class="cta">
    <a href="/visualize" class="btn btn-primary">Visualize Seismic Patterns</a>
    <a href="/map" class="btn btn-dark">Latest Earthquakes on Map</a>
</section>"#,
    )
}

/// Map page in its loading state.
#[must_use]
pub fn map_shell() -> String {
    let body = format!(
        r#"<div id="map-view" hx-get="/map/data" hx-trigger="load" hx-swap="innerHTML">
    {loading}
</div>"#,
        loading = message("loading", MAP_LOADING),
    );
    layout("Map", &body)
}

/// Dashboard page in its loading state.
#[must_use]
pub fn visualize_shell(order: SortOrder) -> String {
    let body = format!(
        r#"<div id="dashboard" hx-get="/visualize/data?order={order}" hx-trigger="load" hx-swap="innerHTML">
    {loading}
</div>"#,
        order = order.as_str(),
        loading = message("loading", DASHBOARD_LOADING),
    );
    layout("Seismic Patterns", &body)
}

#[must_use]
pub fn not_found_page() -> String {
    layout(
        "Not Found",
        r#"<section class="not-found">
    <h1>404</h1>
    <h2>Oops! Page Not Found</h2>
    <p>The page you are looking for does not exist, or is temporarily unavailable.</p>
    <a href="/" class="btn btn-primary">Go Back Home</a>
</section>"#,
    )
}

// ============================================================================
// Map fragment
// ============================================================================

#[derive(Serialize)]
struct Marker {
    lat: f64,
    lon: f64,
    popup: String,
}

fn popup_html(event: &EventRecord) -> String {
    let place = event.place.as_deref().unwrap_or("Unknown location");
    let link = event
        .url
        .as_deref()
        .map(|url| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="popup-link">View Details</a>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="popup">
  <h3>{place}</h3>
  <div class="popup-row"><span>Magnitude:</span><span class="popup-mag">{mag}</span></div>
  <div class="popup-row"><span>Depth:</span><span>{depth} km</span></div>
  {link}
</div>"#,
        place = escape_html(place),
        mag = event.mag.map(|m| m.to_string()).unwrap_or_default(),
        depth = event.depth_km,
    )
}

/// Map data fragment for a settled load.
#[must_use]
pub fn map_fragment(state: &LoadState<Vec<EventRecord>>) -> String {
    match state {
        LoadState::Idle | LoadState::Loading => message("loading", MAP_LOADING),
        LoadState::Failed(reason) => message("error", reason),
        LoadState::NoData => message("empty", MAP_EMPTY),
        LoadState::Ready(events) => {
            let markers: Vec<Marker> = events
                .iter()
                .map(|e| Marker {
                    lat: e.latitude,
                    lon: e.longitude,
                    popup: popup_html(e),
                })
                .collect();

            format!(
                r#"<h2 class="page-title">Recent Earthquakes</h2>
<div id="quake-map" class="quake-map"></div>
<script>
(function() {{
  var street = L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
    attribution: '&copy; <a href="https://osm.org/copyright">OpenStreetMap</a>'
  }});
  var satellite = L.tileLayer('https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{{z}}/{{y}}/{{x}}', {{
    attribution: '&copy; <a href="https://www.esri.com/">Esri</a>, Earthstar Geographics'
  }});
  var map = L.map('quake-map', {{ center: [20, 0], zoom: 2, layers: [street] }});
  L.control.layers({{ 'Street Map': street, 'Satellite View': satellite }}, null, {{ position: 'topright' }}).addTo(map);
  var quakeIcon = L.icon({{
    iconUrl: '{QUAKE_ICON_URL}',
    iconSize: [25, 25],
    iconAnchor: [12, 25],
    popupAnchor: [0, -20]
  }});
  var markers = {markers};
  markers.forEach(function(m) {{
    L.marker([m.lat, m.lon], {{ icon: quakeIcon }}).bindPopup(m.popup).addTo(map);
  }});
}})();
</script>"#,
                markers = script_json(&markers),
            )
        }
    }
}

// ============================================================================
// Dashboard fragment
// ============================================================================

/// A chart card: a canvas when there is data, a notice otherwise.
fn chart_card(id: &str, title: &str, has_data: bool) -> String {
    let content = if has_data {
        format!(r#"<canvas id="{id}" height="300"></canvas>"#)
    } else {
        message("empty", CHART_EMPTY)
    };
    format!(
        r#"<div class="card">
  <h3>{title}</h3>
  {content}
</div>"#
    )
}

fn largest_table(rows: &[LargestRow], order: SortOrder) -> String {
    if rows.is_empty() {
        return message("empty", TABLE_EMPTY);
    }

    let arrow = match order {
        SortOrder::Asc => "▲",
        SortOrder::Desc => "▼",
    };

    let body: String = rows
        .iter()
        .map(|r| {
            format!(
                r#"<tr>
  <td class="nowrap">{date}</td>
  <td>{place}</td>
  <td class="bold">{mag:.1}</td>
  <td>{depth:.1}</td>
</tr>
"#,
                date = escape_html(&r.date),
                place = escape_html(r.place.as_deref().unwrap_or("")),
                mag = r.magnitude,
                depth = r.depth,
            )
        })
        .collect();

    format!(
        r##"<table class="largest">
  <thead>
    <tr>
      <th>Date</th>
      <th>Location</th>
      <th><a href="/visualize?order={next}" hx-get="/visualize/data?order={next}" hx-target="#dashboard" hx-swap="innerHTML">Magnitude {arrow}</a></th>
      <th>Depth (km)</th>
    </tr>
  </thead>
  <tbody>
{body}  </tbody>
</table>"##,
        next = order.flipped().as_str(),
    )
}

/// Dashboard data fragment for a settled load.
#[must_use]
pub fn dashboard_fragment(state: &LoadState<Dashboard>, order: SortOrder) -> String {
    let dashboard = match state {
        LoadState::Idle | LoadState::Loading => return message("loading", DASHBOARD_LOADING),
        LoadState::Failed(reason) => return message("error", reason),
        LoadState::NoData => return message("empty", DASHBOARD_EMPTY),
        LoadState::Ready(dashboard) => dashboard,
    };

    let cards = [
        chart_card(
            "chart-frequency",
            "Frequency vs Magnitude",
            !dashboard.magnitude_frequency.is_empty(),
        ),
        chart_card(
            "chart-depth",
            "Depth vs Magnitude",
            !dashboard.depth_vs_magnitude.is_empty(),
        ),
        chart_card(
            "chart-depth-region",
            "Average Depth vs Region",
            !dashboard.depth_by_region.is_empty(),
        ),
        chart_card(
            "chart-time",
            "Magnitude vs Time",
            !dashboard.magnitude_over_time.is_empty(),
        ),
        chart_card(
            "chart-avg-region",
            "Average Magnitude vs Region",
            !dashboard.average_magnitude_by_region.is_empty(),
        ),
        chart_card(
            "chart-distribution",
            "Geographical Distribution",
            !dashboard.count_by_region.is_empty(),
        ),
    ]
    .join("\n");

    format!(
        r#"<h2 class="page-title">Seismic Patterns</h2>
<div class="grid">
{cards}
</div>
<div class="card table-card">
  <h3>20 Largest Earthquakes in the World Since 1900</h3>
  {table}
</div>
<script>
(function() {{
  var data = {data};
  var COLORS = ['#3b82f6', '#ef4444', '#10b981', '#f59e0b', '#8b5cf6', '#ec4899'];
  function draw(id, config) {{
    var el = document.getElementById(id);
    if (!el) return;
    if (el._chart) el._chart.destroy();
    el._chart = new Chart(el, config);
  }}
  function axes(x, y, extraX) {{
    return {{
      x: Object.assign({{ title: {{ display: true, text: x }} }}, extraX || {{}}),
      y: {{ title: {{ display: true, text: y }} }}
    }};
  }}
  draw('chart-frequency', {{
    type: 'bar',
    data: {{
      labels: data.magnitude_frequency.map(function(r) {{ return r.bucket; }}),
      datasets: [{{ label: 'Frequency', data: data.magnitude_frequency.map(function(r) {{ return r.count; }}), backgroundColor: '#3b82f6' }}]
    }},
    options: {{ scales: axes('Magnitude', 'Frequency') }}
  }});
  draw('chart-depth', {{
    type: 'scatter',
    data: {{ datasets: [{{ label: 'Events', data: data.depth_vs_magnitude.map(function(r) {{ return {{ x: r.depth, y: r.magnitude }}; }}), backgroundColor: '#10b981' }}] }},
    options: {{ scales: axes('Depth (km)', 'Magnitude') }}
  }});
  var regions = [];
  data.depth_by_region.forEach(function(r) {{ if (regions.indexOf(r.region) < 0) regions.push(r.region); }});
  draw('chart-depth-region', {{
    type: 'scatter',
    data: {{ datasets: [{{ label: 'Depth', data: data.depth_by_region.map(function(r) {{ return {{ x: r.region, y: r.depth }}; }}), backgroundColor: '#10b981' }}] }},
    options: {{ scales: axes('Region', 'Depth (km)', {{ type: 'category', labels: regions }}) }}
  }});
  draw('chart-time', {{
    type: 'line',
    data: {{
      labels: data.magnitude_over_time.map(function(r) {{ return r.time; }}),
      datasets: [{{ label: 'Magnitude', data: data.magnitude_over_time.map(function(r) {{ return r.magnitude; }}), borderColor: '#ef4444', tension: 0.3 }}]
    }},
    options: {{ scales: axes('Time (Hours)', 'Magnitude') }}
  }});
  draw('chart-avg-region', {{
    type: 'bar',
    data: {{
      labels: data.average_magnitude_by_region.map(function(r) {{ return r.region; }}),
      datasets: [{{ label: 'Average magnitude', data: data.average_magnitude_by_region.map(function(r) {{ return r.avgMagnitude; }}), backgroundColor: '#3b82f6' }}]
    }},
    options: {{ scales: axes('Region', 'Magnitude') }}
  }});
  draw('chart-distribution', {{
    type: 'pie',
    data: {{
      labels: data.count_by_region.map(function(r) {{ return r.region; }}),
      datasets: [{{
        data: data.count_by_region.map(function(r) {{ return r.count; }}),
        backgroundColor: data.count_by_region.map(function(_, i) {{ return COLORS[i % COLORS.length]; }})
      }}]
    }}
  }});
}})();
</script>"#,
        table = largest_table(&dashboard.largest, order),
        data = script_json(dashboard),
    )
}

const STYLE: &str = r"
:root {
    --accent: #2563eb;
    --text: #111827;
    --muted: #4b5563;
    --surface: #ffffff;
    --bg: #f9fafb;
}
* { box-sizing: border-box; }
body {
    margin: 0;
    min-height: 100vh;
    display: flex;
    flex-direction: column;
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    background: var(--bg);
    color: var(--text);
}
a { color: var(--accent); }
.header { background: #eff6ff; box-shadow: 0 1px 2px rgba(0,0,0,0.06); }
.header-inner {
    max-width: 1200px;
    margin: 0 auto;
    padding: 1rem;
    display: flex;
    justify-content: space-between;
    align-items: center;
}
.logo { font-size: 1.25rem; font-weight: 700; color: var(--text); text-decoration: none; }
.nav { display: flex; gap: 1.5rem; font-size: 1.05rem; }
.nav a { color: var(--text); text-decoration: none; }
.nav a:hover { color: var(--accent); }
.main { flex: 1; padding: 2rem 1rem; max-width: 1280px; width: 100%; margin: 0 auto; }
.footer { background: #d1d5db; text-align: center; padding: 1rem; }
.hero { text-align: center; padding: 3rem 1rem; }
.hero h1 { font-size: 2.75rem; color: #1d4ed8; margin-bottom: 1.5rem; }
.hero p { max-width: 48rem; margin: 0 auto; color: var(--muted); font-size: 1.1rem; }
.cta { display: flex; gap: 1rem; justify-content: center; flex-wrap: wrap; }
.btn {
    display: inline-block;
    padding: 0.9rem 1.75rem;
    border-radius: 0.75rem;
    color: #fff;
    text-decoration: none;
    font-weight: 500;
    box-shadow: 0 4px 10px rgba(0,0,0,0.15);
}
.btn-primary { background: #2563eb; }
.btn-primary:hover { background: #1d4ed8; }
.btn-dark { background: #111827; }
.message { text-align: center; margin-top: 10rem; font-size: 1.2rem; }
.message.loading { color: #374151; }
.message.error { color: #dc2626; font-weight: 600; }
.message.empty { color: var(--muted); margin-top: 2rem; }
.page-title { text-align: center; font-size: 1.9rem; margin-bottom: 1.5rem; }
.quake-map { height: 75vh; width: 100%; border-radius: 0.5rem; box-shadow: 0 4px 10px rgba(0,0,0,0.15); }
.popup { width: 16rem; }
.popup h3 { margin: 0 0 0.5rem; }
.popup-row { display: flex; justify-content: space-between; margin-bottom: 0.25rem; }
.popup-mag { color: #ef4444; font-weight: 600; }
.popup-link { display: block; text-align: center; margin-top: 0.5rem; }
.grid { display: grid; gap: 2rem; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); }
.card { background: var(--surface); padding: 1.5rem; border-radius: 0.75rem; box-shadow: 0 2px 6px rgba(0,0,0,0.08); }
.table-card { margin-top: 3rem; overflow-x: auto; }
.largest { width: 100%; border-collapse: collapse; }
.largest th { background: #1e3a8a; color: #fff; text-align: left; }
.largest th a { color: #fff; }
.largest th, .largest td { padding: 0.5rem; border: 1px solid #d1d5db; }
.largest tr:hover td { background: #f3f4f6; }
.nowrap { white-space: nowrap; }
.bold { font-weight: 700; }
.not-found { text-align: center; padding: 4rem 1rem; }
.not-found h1 { font-size: 8rem; color: var(--accent); margin: 0; }
.menu-toggle { display: none; background: none; border: 0; font-size: 1.6rem; cursor: pointer; }
@media (max-width: 768px) {
    .header-inner { flex-wrap: wrap; }
    .menu-toggle { display: block; }
    .nav { display: none; width: 100%; flex-direction: column; gap: 0.75rem; text-align: center; }
    .nav.open { display: flex; }
    .grid { grid-template-columns: 1fr; }
    .hero h1 { font-size: 2rem; }
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::event;
    use crate::aggregate::{DisplayZone, SortOrder};
    use crate::errors::FETCH_FAILED_MESSAGE;

    fn zone() -> DisplayZone {
        DisplayZone::from_offset_minutes(Some(0)).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_script_json_cannot_close_script() {
        let json = script_json(&vec!["</script><script>alert(1)"]);
        assert!(!json.contains("</script>"));
    }

    #[test]
    fn test_shells_request_their_fragment() {
        assert!(map_shell().contains(r#"hx-get="/map/data""#));
        assert!(map_shell().contains(MAP_LOADING));
        assert!(visualize_shell(SortOrder::Asc).contains(r#"hx-get="/visualize/data?order=asc""#));
    }

    #[test]
    fn test_layout_navigation() {
        let page = landing_page();
        for href in [r#"href="/""#, r#"href="/map""#, r#"href="/visualize""#] {
            assert!(page.contains(href), "missing {href}");
        }
        assert!(page.contains("Powered by"));
        assert!(page.contains("menu-toggle"));
        assert!(page.contains(r#"id="site-nav""#));
    }

    #[test]
    fn test_map_fragment_states() {
        assert!(map_fragment(&LoadState::NoData).contains(MAP_EMPTY));
        assert!(
            map_fragment(&LoadState::Failed(FETCH_FAILED_MESSAGE.into()))
                .contains(FETCH_FAILED_MESSAGE)
        );
    }

    #[test]
    fn test_map_popup_contents() {
        let events = vec![event("us1", Some("5km N of <Reno>, NV"), 4.2, 7.5)];
        let html = map_fragment(&LoadState::Ready(events));

        assert!(html.contains("L.marker"));
        assert!(html.contains("5km N of &lt;Reno&gt;, NV"));
        assert!(html.contains("Magnitude:"));
        assert!(html.contains("7.5 km"));
        assert!(html.contains("https://earthquake.usgs.gov/earthquakes/eventpage/us1"));
        assert!(html.contains("View Details"));
        assert!(html.contains("684908.png"));
        assert!(html.contains("icon: quakeIcon"));
    }

    #[test]
    fn test_popup_leaves_missing_magnitude_blank() {
        let mut quake = event("us3", None, 0.0, 35.0);
        quake.mag = None;
        let popup = popup_html(&quake);

        assert!(popup.contains(r#"<span class="popup-mag"></span>"#));
        assert!(popup.contains("Unknown location"));

        quake.mag = Some(0.0);
        assert!(popup_html(&quake).contains(r#"<span class="popup-mag">0</span>"#));
    }

    #[test]
    fn test_dashboard_fragment_states() {
        assert!(dashboard_fragment(&LoadState::NoData, SortOrder::Desc).contains(DASHBOARD_EMPTY));
        assert!(
            dashboard_fragment(&LoadState::Failed(FETCH_FAILED_MESSAGE.into()), SortOrder::Desc)
                .contains(FETCH_FAILED_MESSAGE)
        );
    }

    #[test]
    fn test_dashboard_ready_renders_charts_and_table() {
        let recent = vec![
            event("a", Some("10km SE of Springfield, IL"), 4.2, 10.0),
            event("b", Some("NV"), 6.0, 33.0),
        ];
        let historical = vec![event("h", Some("Tohoku, Japan"), 9.1, 29.0)];
        let dashboard = Dashboard::build(&recent, &historical, SortOrder::Desc, &zone());
        let html = dashboard_fragment(&LoadState::Ready(dashboard), SortOrder::Desc);

        for id in [
            "chart-frequency",
            "chart-depth",
            "chart-depth-region",
            "chart-time",
            "chart-avg-region",
            "chart-distribution",
        ] {
            assert!(html.contains(&format!(r#"<canvas id="{id}""#)), "missing {id}");
        }
        assert!(html.contains("Tohoku, Japan"));
        assert!(html.contains("9.1"));
        assert!(html.contains("29.0"));
        assert!(html.contains("order=asc"));
        assert!(!html.contains(CHART_EMPTY));
    }

    #[test]
    fn test_dashboard_empty_table() {
        let recent = vec![event("a", Some("Alaska"), 2.5, 1.0)];
        let dashboard = Dashboard::build(&recent, &[], SortOrder::Desc, &zone());
        let html = dashboard_fragment(&LoadState::Ready(dashboard), SortOrder::Desc);
        assert!(html.contains(TABLE_EMPTY));
    }

    #[test]
    fn test_not_found_page() {
        let page = not_found_page();
        assert!(page.contains("404"));
        assert!(page.contains("Go Back Home"));
    }
}
