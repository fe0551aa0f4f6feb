use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::domain::Adherence;

/// グローバルな tracing subscriber を設定
///
/// `RUST_LOG` があれば `config.filter` より優先。すでに subscriber が
/// 設定済みなら `false` を返す（テストや組み込み先アプリ）。
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

/// adherence の種類ごとの日数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub no_tasks: usize,
    pub no_events: usize,
    pub progress_days: usize,
    pub mean_progress: Option<f64>,
}

impl AdherenceSummary {
    pub fn from_days(days: &[Adherence]) -> Self {
        let mut summary = Self::default();
        let mut total = 0.0;
        for day in days {
            match day {
                Adherence::NoTasks => summary.no_tasks += 1,
                Adherence::NoEvents => summary.no_events += 1,
                Adherence::Progress(p) => {
                    summary.progress_days += 1;
                    total += p;
                }
            }
        }
        if summary.progress_days > 0 {
            summary.mean_progress = Some(total / summary.progress_days as f64);
        }
        summary
    }
}
