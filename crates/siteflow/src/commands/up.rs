use crate::render;
use siteflow_config::SiteConfig;

pub async fn handle(config: &SiteConfig, json: bool) -> anyhow::Result<i32> {
    if !json {
        render::banner("収束を開始", config);
    }

    let converger = super::converger(config).await;
    let report = converger.converge().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::report(&report);
    }
    Ok(report.outcome.exit_code())
}
