use crate::render;
use siteflow_config::SiteConfig;

/// 変更は一切行わない
pub async fn handle(config: &SiteConfig, json: bool) -> anyhow::Result<i32> {
    if !json {
        render::banner("実行計画", config);
    }

    let converger = super::converger(config).await;
    match converger.plan().await {
        Ok(plan) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                render::plan(&plan);
            }
            Ok(0)
        }
        Err(failure) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&failure)?);
            } else {
                render::failure(&failure);
            }
            Ok(failure.kind.exit_code())
        }
    }
}
