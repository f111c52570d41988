//! Test-result records and artifact store mocks

use vrt_results::TestResultRecord;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// View key the mock store accepts
pub const VIEW_KEY: &str = "test-view-key";

/// Minimal PNG signature used as image body
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

/// Record with three steps (PASS, FAIL, NEW) whose artifact links point at `server`
///
/// Links are relative `/api/...` paths, resolved against the server taken
/// from `appUrls.session`, as the provider reports them.
pub fn three_step_record(server: &str) -> TestResultRecord {
    let json = format!(
        r#"{{
            "name": "Simple Test",
            "appName": "Google Page",
            "hostDisplaySize": {{ "width": 1000, "height": 700 }},
            "hostOS": "Linux",
            "hostApp": "Chrome",
            "appUrls": {{ "session": "{server}/app/batches/00000251/00000252" }},
            "batchId": "00000251",
            "id": "00000252",
            "steps": 3,
            "stepsInfo": [
                {{
                    "name": "landing",
                    "isDifferent": false,
                    "hasBaselineImage": true,
                    "hasCurrentImage": true,
                    "apiUrls": {{
                        "baselineImage": "/api/images/b1",
                        "currentImage": "/api/images/c1",
                        "diffImage": "/api/sessions/00000252/steps/1/diff"
                    }}
                }},
                {{
                    "name": "login",
                    "isDifferent": true,
                    "hasBaselineImage": true,
                    "hasCurrentImage": true,
                    "apiUrls": {{
                        "baselineImage": "/api/images/b2",
                        "currentImage": "/api/images/c2",
                        "diffImage": "/api/sessions/00000252/steps/2/diff"
                    }}
                }},
                {{
                    "name": "profile",
                    "isDifferent": false,
                    "hasBaselineImage": false,
                    "hasCurrentImage": true,
                    "apiUrls": {{
                        "baselineImage": null,
                        "currentImage": "/api/images/c3",
                        "diffImage": null
                    }}
                }}
            ]
        }}"#
    );
    serde_json::from_str(&json).expect("fixture record is valid JSON")
}

/// Serve `PNG_BYTES` at every artifact path of [`three_step_record`]
pub async fn mount_artifact_store(server: &MockServer) {
    let paths = [
        "/api/images/b1",
        "/api/images/c1",
        "/api/images/b2",
        "/api/images/c2",
        "/api/images/c3",
        "/api/sessions/00000252/steps/1/diff",
        "/api/sessions/00000252/steps/2/diff",
    ];
    for p in paths {
        Mock::given(method("GET"))
            .and(path(p))
            .and(query_param("apiKey", VIEW_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
            .mount(server)
            .await;
    }
}
