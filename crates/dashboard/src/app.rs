//! HTTP routes and page rendering for the dashboard

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use monitor_lib::{Assessment, Error, MonitorMetrics, PotabilityMonitor, Prediction, WaterReadings};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Measurement inputs shown on the form, with typical values pre-filled.
const FORM_FIELDS: &[(&str, &str, f64)] = &[
    ("pH", "ph", 7.0),
    ("Hardness", "hardness", 180.0),
    ("Solids", "solids", 20000.0),
    ("Chloramines", "chloramines", 7.0),
    ("Sulfate", "sulfate", 350.0),
    ("Conductivity", "conductivity", 400.0),
    ("Organic_carbon", "organic_carbon", 12.0),
    ("Trihalomethanes", "trihalomethanes", 60.0),
    ("Turbidity", "turbidity", 4.0),
];

const STYLE: &str = "<style>\
body{font-family:sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem}\
td{padding:0.25rem 0.5rem}\
input{width:10rem}\
button{margin-top:1rem;padding:0.5rem 1rem}\
.banner{padding:1rem;border-radius:4px;margin:1rem 0}\
.ok{background:#e6f4ea;border:1px solid #34a853}\
.alert{background:#fce8e6;border:1px solid #ea4335}\
.warning{color:#b05a00}\
pre{background:#f5f5f5;padding:1rem;overflow-x:auto}\
.readings{border-collapse:collapse}\
.readings td,.readings th{border:1px solid #ccc}\
.caption{color:#777;font-size:0.85rem;margin-top:2rem}\
</style>";

/// Shared application state
pub struct AppState {
    pub monitor: PotabilityMonitor,
    pub metrics: MonitorMetrics,
}

impl AppState {
    pub fn new(monitor: PotabilityMonitor, metrics: MonitorMetrics) -> Self {
        Self { monitor, metrics }
    }
}

/// Input form pre-filled with typical measurement values
async fn index() -> Html<String> {
    Html(render_form_page())
}

/// Handle one prediction request end to end
async fn predict(
    State(state): State<Arc<AppState>>,
    Form(readings): Form<WaterReadings>,
) -> Html<String> {
    let record = readings.to_record();
    let started = Instant::now();

    match state.monitor.check(&record).await {
        Ok((prediction, assessment)) => {
            state
                .metrics
                .observe_scoring_latency(started.elapsed().as_secs_f64());
            state.metrics.inc_predictions();
            if !assessment.is_potable() {
                state.metrics.inc_alerts();
            }
            Html(render_result_page(&prediction, &assessment))
        }
        Err(err) => {
            state.metrics.inc_prediction_errors();
            if matches!(err, Error::Auth { .. }) || err.is_auth_rejection() {
                state.metrics.inc_auth_failures();
            }
            error!(error = %err, "Prediction request failed");
            Html(render_error_page(&err))
        }
    }
}

/// Liveness probe
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

fn render_form_page() -> String {
    let mut rows = String::new();
    for &(label, name, default) in FORM_FIELDS {
        rows.push_str(&format!(
            "<tr><td><label for=\"{name}\">{label}</label></td>\
             <td><input type=\"number\" step=\"any\" id=\"{name}\" name=\"{name}\" value=\"{default}\" required></td></tr>"
        ));
    }

    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <title>Water Quality Monitoring Dashboard</title>{STYLE}</head><body>\
         <h1>Water Quality Monitoring Dashboard</h1>\
         <p>Enter water quality parameters to predict potability:</p>\
         <form method=\"post\" action=\"/predict\"><table>{rows}</table>\
         <button type=\"submit\">Predict Potability</button></form>\
         <p class=\"caption\">This dashboard is part of a multi-agent system for water quality monitoring.</p>\
         </body></html>"
    )
}

fn render_result_page(prediction: &Prediction, assessment: &Assessment) -> String {
    let label = escape_html(&prediction.label.to_string());

    let verdict = match assessment {
        Assessment::Potable => {
            format!("<div class=\"banner ok\">{}</div>", assessment.headline())
        }
        Assessment::NonPotable { readings } => {
            let mut rows = String::new();
            for (name, value) in readings.iter() {
                rows.push_str(&format!(
                    "<tr><td>{}</td><td>{value}</td></tr>",
                    escape_html(name)
                ));
            }
            format!(
                "<div class=\"banner alert\">{}</div>\
                 <p class=\"warning\">Warning: Water quality may be compromised. Further investigation recommended.</p>\
                 <h2>Submitted Readings</h2>\
                 <table class=\"readings\"><tr><th>Measurement</th><th>Value</th></tr>{rows}</table>",
                assessment.headline()
            )
        }
    };

    let raw = escape_html(
        &serde_json::to_string_pretty(&prediction.response)
            .unwrap_or_else(|_| prediction.response.to_string()),
    );

    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <title>Prediction Result</title>{STYLE}</head><body>\
         <h1>Prediction Result</h1>\
         <p>Prediction result: Potability = {label}</p>\
         {verdict}\
         <h2>Raw API Response</h2><pre>{raw}</pre>\
         <p><a href=\"/\">Run another prediction</a></p>\
         </body></html>"
    )
}

fn render_error_page(err: &Error) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <title>Prediction Result</title>{STYLE}</head><body>\
         <h1>Prediction Result</h1>\
         <div class=\"banner alert\">Failed to get prediction: {}</div>\
         <p><a href=\"/\">Try again</a></p>\
         </body></html>",
        escape_html(&err.to_string())
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Create the dashboard router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the dashboard server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting dashboard server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use monitor_lib::ScoringConfig;
    use tower::ServiceExt;

    const FORM_BODY: &str = "ph=7.0&hardness=180.0&solids=20000.0&chloramines=7.0&sulfate=350.0&conductivity=400.0&organic_carbon=12.0&trihalomethanes=60.0&turbidity=4.0";

    fn scoring_config(endpoint: &str) -> ScoringConfig {
        ScoringConfig {
            api_key: "test-key".to_string(),
            api_endpoint: endpoint.to_string(),
        }
    }

    /// Router whose monitor points at the given IAM and scoring endpoints.
    fn test_router(iam_url: &str, scoring_url: &str) -> Router {
        let monitor = PotabilityMonitor::with_token_url(&scoring_config(scoring_url), iam_url)
            .expect("monitor should build");
        let state = Arc::new(AppState::new(monitor, MonitorMetrics::new()));
        create_router(state)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn predict_request() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(FORM_BODY))
            .unwrap()
    }

    #[tokio::test]
    async fn test_form_page_shows_all_nine_inputs() {
        let app = test_router("http://127.0.0.1:9/token", "http://127.0.0.1:9/score");

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        for &(_, name, _) in FORM_FIELDS {
            assert!(
                body.contains(&format!("name=\"{name}\"")),
                "form should have an input for {name}"
            );
        }
        assert!(body.contains("value=\"20000\""), "defaults should be pre-filled");
        assert!(body.contains("Predict Potability"));
    }

    #[tokio::test]
    async fn test_healthz_returns_ok() {
        let app = test_router("http://127.0.0.1:9/token", "http://127.0.0.1:9/score");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        let health: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "ok");
    }

    #[tokio::test]
    async fn test_metrics_endpoint_returns_prometheus_format() {
        let app = test_router("http://127.0.0.1:9/token", "http://127.0.0.1:9/score");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let body = body_text(response).await;
        assert!(body.contains("water_monitor_predictions_total"));
        assert!(body.contains("water_monitor_scoring_latency_seconds"));
    }

    #[tokio::test]
    async fn test_predict_renders_alert_with_readings() {
        let mut iam = mockito::Server::new_async().await;
        let mut scoring = mockito::Server::new_async().await;

        let iam_mock = iam
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-123", "expires_in": 3600}"#)
            .create_async()
            .await;
        let scoring_mock = scoring
            .mock("POST", "/")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_body(r#"{"predictions": [{"values": [[0]]}]}"#)
            .create_async()
            .await;

        let app = test_router(&iam.url(), &scoring.url());
        let response = app.oneshot(predict_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("NON-POTABLE"));
        assert!(body.contains("Water quality may be compromised"));
        assert!(body.contains("Hardness"), "alert page should list readings");
        assert!(body.contains("180"), "alert page should show submitted values");
        assert!(
            body.contains("predictions"),
            "raw response should be displayed"
        );

        iam_mock.assert_async().await;
        scoring_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_predict_renders_potable_without_readings() {
        let mut iam = mockito::Server::new_async().await;
        let mut scoring = mockito::Server::new_async().await;

        iam.mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-123", "expires_in": 3600}"#)
            .create_async()
            .await;
        scoring
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"predictions": [{"values": [[1]]}]}"#)
            .create_async()
            .await;

        let app = test_router(&iam.url(), &scoring.url());
        let response = app.oneshot(predict_request()).await.unwrap();

        let body = body_text(response).await;
        assert!(body.contains("POTABLE"));
        assert!(!body.contains("NON-POTABLE"));
        assert!(
            !body.contains("Hardness"),
            "potable page should not surface the readings"
        );
    }

    #[tokio::test]
    async fn test_predict_renders_error_section_on_failure() {
        let mut iam = mockito::Server::new_async().await;
        let mut scoring = mockito::Server::new_async().await;

        iam.mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-123", "expires_in": 3600}"#)
            .create_async()
            .await;
        scoring
            .mock("POST", "/")
            .with_status(500)
            .with_body("internal failure")
            .create_async()
            .await;

        let app = test_router(&iam.url(), &scoring.url());
        let response = app.oneshot(predict_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("Failed to get prediction"));
        assert!(body.contains("500"), "error section should name the status");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<pre>&"quoted"</pre>"#),
            "&lt;pre&gt;&amp;&quot;quoted&quot;&lt;/pre&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
