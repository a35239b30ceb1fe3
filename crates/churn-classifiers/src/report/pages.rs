//! Maud HTML pages for the classification-report artifacts.
use maud::{html, PreEscaped, DOCTYPE};

use crate::metrics::ClassificationReport;

const PAGE_CSS: &str = "\
body { font-family: sans-serif; margin: 2em; }\n\
.generated { color: #666; font-size: 0.85em; }\n\
.report-grid { display: flex; gap: 2em; flex-wrap: wrap; }\n\
.code-container {\n\
    background-color: #f5f5f5;\n\
    padding: 10px;\n\
    border-radius: 5px;\n\
    overflow-x: auto;\n\
    font-family: monospace;\n\
    white-space: pre-wrap;\n\
}";

/// Render a model's train and test classification reports side by side on
/// one page, for human comparison.
pub fn classification_report_page(
    model_name: &str,
    train: &ClassificationReport,
    test: &ClassificationReport,
) -> String {
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (model_name) " results" }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                h1 { (model_name) " results" }
                p class="generated" { "Generated " (generated) }
                div class="report-grid" {
                    div {
                        h2 { (model_name) " Train" }
                        div class="code-container" {
                            pre { code { (train.to_string()) } }
                        }
                    }
                    div {
                        h2 { (model_name) " Test" }
                        div class="code-container" {
                            pre { code { (test.to_string()) } }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}
