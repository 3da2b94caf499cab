//! Server-rendered dashboard page
//!
//! Landing hero plus the live tracker table, rendered from the current store
//! state on every request. The inline script plays the headline animation,
//! shows toasts from `/api/crypto/ws`, wires the Retry button and swaps in a
//! fresh tracker fragment from `/api/crypto/tracker` when the store changes.

use axum::{extract::State, response::Html};
use std::fmt::Write;

use crate::{
    AppState,
    handlers::hero::HEADLINE_PREFIX,
    models::quote::AssetQuote,
    services::{
        crypto_store::{CryptoState, FetchStatus},
        typewriter::HERO_PHRASES,
    },
    utils::format::{
        format_currency, format_number, format_percentage, format_time, is_gain,
        supply_used_percent,
    },
};

const FEATURES: [&str; 4] = [
    "Live price updates",
    "Historical performance data",
    "Market cap tracking",
    "Volume analysis",
];

/// Handler for GET /
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(render_dashboard(&state.store.state()))
}

/// Handler for GET /api/crypto/tracker
/// Just the `#crypto-tracker` section, for in-place updates
pub async fn tracker_fragment(State(state): State<AppState>) -> Html<String> {
    Html(render_tracker(&state.store.state()))
}

pub fn render_dashboard(state: &CryptoState) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str(PAGE_HEAD);
    html.push_str(&render_hero());
    html.push_str(&render_tracker(state));
    html.push_str(PAGE_TAIL);
    html
}

fn render_hero() -> String {
    let features: String = FEATURES
        .iter()
        .map(|f| format!("<li>{}</li>", escape_html(f)))
        .collect();

    format!(
        r##"<section class="hero">
  <div class="brand">CRYPTO VISION</div>
  <h1><span class="gradient-text">{prefix}</span><span id="typing-text" class="typing-text">{first}</span></h1>
  <p class="tagline">Get real-time cryptocurrency data, market insights, and trends, all in one powerful dashboard.</p>
  <a class="cta" href="#crypto-tracker">View Live Prices</a>
  <div class="glass-card">
    <h3>Real-Time Cryptocurrency Tracking</h3>
    <p>Stay up to date with the latest prices, market caps, and trends for the top cryptocurrencies. Our platform refreshes automatically to ensure you have the most current data.</p>
    <ul>{features}</ul>
  </div>
</section>
"##,
        prefix = escape_html(HEADLINE_PREFIX),
        first = escape_html(HERO_PHRASES[0]),
        features = features,
    )
}

fn render_tracker(state: &CryptoState) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<section id="crypto-tracker">
  <h2>Live Crypto Tracker</h2>
  <p>Real-time cryptocurrency data with latest prices, market cap, and performance metrics. Data updates every 30 seconds.</p>
"#,
    );

    if let Some(at) = state.last_updated {
        let _ = writeln!(
            html,
            r#"  <p class="last-updated">Last updated: {}</p>"#,
            format_time(at)
        );
    }

    html.push_str(
        r#"  <div class="glass-card table">
    <div class="row header"><div>#</div><div>Name</div><div>Price</div><div>1h %</div><div>24h %</div><div>7d %</div><div>Market Cap</div><div>Volume (24h)</div><div>Circulating Supply</div></div>
"#,
    );

    if state.show_loading() {
        html.push_str(
            r#"    <div class="loading"><div class="spinner"></div><p>Loading crypto data...</p></div>
"#,
        );
    }

    for quote in &state.data {
        html.push_str(&render_row(quote));
    }

    if state.status == FetchStatus::Failed {
        let error = state.error.as_deref().unwrap_or_default();
        let _ = writeln!(
            html,
            r#"    <div class="error-panel"><p>Failed to load crypto data: {}</p><button id="retry">Retry</button></div>"#,
            escape_html(error)
        );
    }

    html.push_str("  </div>\n</section>\n");
    html
}

fn render_row(quote: &AssetQuote) -> String {
    let symbol = escape_html(&quote.symbol.to_uppercase());

    let icon = quote
        .image
        .as_deref()
        .map(|src| {
            format!(
                r#"<img src="{}" alt="{}" width="24" height="24">"#,
                escape_html(src),
                escape_html(&quote.name)
            )
        })
        .unwrap_or_default();

    let supply_bar = supply_used_percent(quote.circulating_supply, quote.max_supply)
        .map(|pct| {
            format!(
                r#"<div class="supply-bar"><div class="supply-used" style="width: {:.2}%"></div></div>"#,
                pct
            )
        })
        .unwrap_or_default();

    format!(
        r#"    <div class="row" data-id="{id}"><div>{rank}</div><div class="name">{icon}<p>{name}</p><p class="symbol">{symbol}</p></div><div>{price}</div>{h1}{h24}{d7}<div>${market_cap}</div><div>${volume}</div><div><span>{supply}</span> <span class="symbol">{symbol}</span>{supply_bar}</div></div>
"#,
        id = escape_html(&quote.id),
        rank = quote.market_cap_rank,
        icon = icon,
        name = escape_html(&quote.name),
        symbol = symbol,
        price = format_currency(quote.current_price),
        h1 = render_change(quote.price_change_percentage_1h_in_currency),
        h24 = render_change(quote.price_change_percentage_24h_in_currency),
        d7 = render_change(quote.price_change_percentage_7d_in_currency),
        market_cap = format_number(quote.market_cap),
        volume = format_number(quote.total_volume),
        supply = format_number(quote.circulating_supply),
        supply_bar = supply_bar,
    )
}

fn render_change(value: Option<f64>) -> String {
    let (class, arrow) = if is_gain(value) {
        ("up", "&#9650;")
    } else {
        ("down", "&#9660;")
    };
    format!(
        r#"<div class="change {}">{} {}</div>"#,
        class,
        arrow,
        format_percentage(value)
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>CryptoVision</title>
<style>
body { margin: 0; background: #0b0b14; color: #fff; font-family: system-ui, sans-serif; }
.hero { min-height: 80vh; display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 4rem 1rem; text-align: center; }
.brand { font-weight: bold; letter-spacing: .2em; opacity: .9; }
.gradient-text { background: linear-gradient(90deg, #8b5cf6, #3b82f6); -webkit-background-clip: text; color: transparent; }
.typing-text { border-right: 2px solid #8b5cf6; padding-right: 2px; }
.tagline { color: #d1d5db; max-width: 40rem; font-size: 1.25rem; }
.cta { display: inline-block; margin: 1.5rem 0 3rem; padding: .75rem 1.5rem; border-radius: .5rem; background: linear-gradient(90deg, #8b5cf6, #3b82f6); color: #fff; text-decoration: none; }
.glass-card { background: rgba(255,255,255,.05); border: 1px solid rgba(255,255,255,.1); border-radius: 1rem; padding: 1.5rem; }
#crypto-tracker { padding: 5rem 1rem; max-width: 1200px; margin: 0 auto; overflow-x: auto; }
#crypto-tracker > h2, #crypto-tracker > p { text-align: center; }
.last-updated { color: #9ca3af; font-size: .875rem; }
.table { min-width: 1000px; }
.row { display: grid; grid-template-columns: 1fr 2fr 1fr 1fr 1fr 1fr 2fr 1fr 2fr; gap: .5rem; align-items: center; padding: 1rem; margin-bottom: .5rem; border-radius: .5rem; background: rgba(255,255,255,.05); }
.row.header { background: none; color: #9ca3af; font-size: .875rem; }
.row p { margin: 0; }
.symbol { color: #9ca3af; font-size: .75rem; }
.name { display: flex; align-items: center; gap: .5rem; }
.change { text-align: center; }
.change.up { color: #22c55e; }
.change.down { color: #ef4444; }
.supply-bar { margin-top: .25rem; height: 6px; border-radius: 9999px; background: #374151; }
.supply-used { height: 6px; border-radius: 9999px; background: linear-gradient(90deg, #8b5cf6, #3b82f6); }
.loading { text-align: center; padding: 2.5rem 0; color: #9ca3af; }
.spinner { display: inline-block; width: 2rem; height: 2rem; border-radius: 50%; border-bottom: 2px solid #8b5cf6; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.error-panel { background: rgba(127,29,29,.2); border: 1px solid #b91c1c; border-radius: .5rem; padding: 1rem; text-align: center; color: #fca5a5; }
.error-panel button { margin-top: .5rem; padding: .5rem 1rem; border: 0; border-radius: .375rem; background: rgba(255,255,255,.1); color: #fff; cursor: pointer; }
#toasts { position: fixed; right: 1rem; bottom: 1rem; display: flex; flex-direction: column; gap: .5rem; }
.toast { padding: .75rem 1rem; border-radius: .5rem; background: #1f2937; border: 1px solid #374151; min-width: 16rem; }
.toast.destructive { background: #7f1d1d; border-color: #b91c1c; }
.toast strong { display: block; }
</style>
</head>
<body>
"#;

const PAGE_TAIL: &str = r##"<div id="toasts"></div>
<script>
(function () {
  var typing = document.getElementById("typing-text");
  fetch("/api/hero/frames").then(function (r) { return r.json(); }).then(function (hero) {
    var i = 0;
    function step() {
      var frame = hero.frames[i];
      typing.textContent = frame.text;
      i = (i + 1) % hero.frames.length;
      setTimeout(step, frame.delay_ms);
    }
    step();
  }).catch(function () {});

  function toast(n) {
    var el = document.createElement("div");
    el.className = "toast " + n.variant;
    var title = document.createElement("strong");
    title.textContent = n.title;
    var body = document.createElement("span");
    body.textContent = n.description;
    el.appendChild(title);
    el.appendChild(body);
    document.getElementById("toasts").appendChild(el);
    setTimeout(function () { el.remove(); }, n.duration_ms);
  }

  function refreshTracker() {
    return fetch("/api/crypto/tracker").then(function (r) { return r.text(); }).then(function (html) {
      var current = document.getElementById("crypto-tracker");
      if (current) { current.outerHTML = html; }
    }).catch(function () {});
  }

  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var ws = new WebSocket(proto + location.host + "/api/crypto/ws");
  ws.onmessage = function (ev) {
    toast(JSON.parse(ev.data));
    refreshTracker();
  };

  document.addEventListener("click", function (ev) {
    var retry = ev.target.closest("#retry");
    if (!retry) { return; }
    retry.disabled = true;
    fetch("/api/crypto/retry", { method: "POST" }).finally(refreshTracker);
  });
})();
</script>
</body>
</html>
"##;
