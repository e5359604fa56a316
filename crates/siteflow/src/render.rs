//! Terminal output for `up` and `plan`

use colored::Colorize;
use siteflow_cloud::{
    Action, ActionType, Failure, FailureKind, Outcome, PendingReason, Plan, RunReport,
    SiteEndpoint,
};
use siteflow_config::{DnsMode, SiteConfig};

pub fn banner(title: &str, config: &SiteConfig) {
    println!("{}", format!("🌐 {}: {}", title, config.domain).green().bold());
    println!("  リージョン: {}", config.region.cyan());
    if let Some(zone_id) = &config.zone_id {
        println!("  ホストゾーン: {}", zone_id.cyan());
    }
    if config.dns == DnsMode::External {
        println!("  DNS: {}", "外部で管理 (Route 53 は使いません)".cyan());
    }
    println!();
}

fn symbol(action_type: ActionType) -> colored::ColoredString {
    match action_type {
        ActionType::Create => "+".green().bold(),
        ActionType::Update => "~".yellow().bold(),
        ActionType::NoOp => "✓".dimmed(),
        ActionType::Wait => "⏳".normal(),
    }
}

fn action_line(action: &Action) {
    println!(
        "  {} {:<18} {}",
        symbol(action.action_type),
        action.resource.to_string().bold(),
        action.resource_id
    );
    println!("      {}", action.description.dimmed());
}

pub fn report(report: &RunReport) {
    for action in &report.actions {
        action_line(action);
    }
    println!();

    match &report.outcome {
        Outcome::Completed(endpoint) => completed(&report.domain, endpoint),
        Outcome::PendingExternal(reason) => pending(reason),
        Outcome::Failed(failure) => self::failure(failure),
    }
    println!(
        "{}",
        format!("({}ms, 終了コード {})", report.duration_ms, report.outcome.exit_code()).dimmed()
    );
}

fn completed(domain: &str, endpoint: &SiteEndpoint) {
    println!("{}", "✅ サイトの構築が完了しました".green().bold());
    println!("  URL: {}", format!("https://{domain}/").cyan());
    println!(
        "  ディストリビューション: {} ({})",
        endpoint.distribution_id.cyan(),
        endpoint.distribution_domain
    );
    if let Some(record) = &endpoint.manual_record {
        println!("  DNS プロバイダに次のレコードを追加してください:");
        println!("    {}", record.to_string().cyan());
    } else if !endpoint.alias_written {
        println!(
            "  {}",
            "エイリアスレコードは変更していません (--repair-alias で上書き)".dimmed()
        );
    }
}

fn name_server_list(label: &str, names: &[String]) {
    println!("  {}:", label);
    if names.is_empty() {
        println!("    {}", "(なし)".dimmed());
    }
    for name in names {
        println!("    • {}", name.cyan());
    }
}

pub fn pending(reason: &PendingReason) {
    println!("{}", "⏳ 外部の対応待ちです".yellow().bold());
    match reason {
        PendingReason::ZoneCreated {
            zone_id,
            name_servers,
        } => {
            println!("  ホストゾーンを作成しました: {}", zone_id.cyan());
            println!();
            println!("  1. .env に次の行を追加してください:");
            println!("     {}", format!("AWS_ROUTE53_ZONE_ID={zone_id}").cyan());
            println!("  2. レジストラでネームサーバーを次の値に設定してください:");
            for name in name_servers {
                println!("     • {}", name.cyan());
            }
            println!("  3. 反映後にもう一度 `site up` を実行してください");
        }
        PendingReason::NameServersNotPublished { expected } => {
            println!("  ドメインの NS レコードがまだ公開されていません");
            name_server_list("設定すべきネームサーバー", expected);
            println!("  レジストラの設定が反映されるまで待ってから再実行してください");
        }
        PendingReason::NameServersMismatch {
            expected,
            published,
        } => {
            println!("  公開されている NS レコードがホストゾーンと一致しません");
            name_server_list("期待値", expected);
            name_server_list("公開値", published);
            println!("  レジストラの設定を確認してから再実行してください");
        }
        PendingReason::ValidationRecordNotReady { certificate_arn } => {
            println!("  証明書: {}", certificate_arn.cyan());
            println!("  検証用レコードがまだ発行されていません。少し待ってから再実行してください");
        }
        PendingReason::CertificateValidation {
            certificate_arn,
            record,
        } => {
            println!("  証明書: {}", certificate_arn.cyan());
            println!("  検証用レコード: {}", record.to_string().cyan());
            println!("  認証局による検証が完了してから再実行してください");
        }
        PendingReason::ManualValidation {
            certificate_arn,
            record,
        } => {
            println!("  証明書: {}", certificate_arn.cyan());
            println!("  DNS プロバイダに次の検証用レコードを追加してください:");
            println!("    {}", record.to_string().cyan());
            println!("  追加後、検証が完了してから再実行してください");
        }
    }
}

pub fn failure(failure: &Failure) {
    let heading = match failure.kind {
        FailureKind::Probe => "状態の取得に失敗しました",
        FailureKind::Create => "リソースの作成に失敗しました",
        FailureKind::TerminalExternal => "リソースが回復できない状態です",
    };
    println!("{}", format!("❌ {heading}").red().bold());
    println!("  リソース: {}", failure.resource.to_string().bold());
    println!("  種別: {}", failure.kind);
    println!("  詳細: {}", failure.detail);
    if failure.kind == FailureKind::Create {
        println!(
            "  {}",
            "作成済みのリソースは削除していません。原因を解消して再実行してください".dimmed()
        );
    }
}

pub fn plan(plan: &Plan) {
    if plan.actions.is_empty() {
        println!("{}", "計画するアクションはありません".dimmed());
        return;
    }
    for action in &plan.actions {
        action_line(action);
        let mut keys: Vec<&String> = action.details.keys().collect();
        keys.sort();
        for key in keys {
            println!("      {}: {}", key.dimmed(), action.details[key]);
        }
    }
    println!();

    let summary = plan.summary();
    println!("{} {}", "計画:".bold(), summary);
    if !plan.has_changes {
        println!("{}", "✓ 変更はありません".green());
    }
}
