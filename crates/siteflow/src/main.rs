mod assets;
mod commands;
mod render;

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use siteflow_config::{ConfigError, Overrides};
use std::path::PathBuf;

/// Exit code for configuration errors (EX_CONFIG)
const EXIT_CONFIG: i32 = 78;
const EXIT_UNEXPECTED: i32 = 1;

#[derive(Parser)]
#[command(name = "site")]
#[command(about = "何度実行しても同じ形に収束する、静的サイトのインフラ構築", long_about = None)]
struct Cli {
    /// ログを詳細に表示 (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 不足しているリソースを作成し、サイトを収束させる
    Up {
        #[command(flatten)]
        site: SiteArgs,
        /// 実行結果を JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// 変更を加えずに、次回の実行内容を表示
    Plan {
        #[command(flatten)]
        site: SiteArgs,
        /// 計画を JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

/// .env と環境変数より優先される設定
#[derive(Args, Debug, Clone, Default)]
struct SiteArgs {
    /// サイトの FQDN (SITE_FQDN)
    #[arg(short, long)]
    domain: Option<String>,

    /// AWS リージョン (AWS_REGION)
    #[arg(long)]
    region: Option<String>,

    /// 既存の Route 53 ホストゾーン ID (AWS_ROUTE53_ZONE_ID)
    #[arg(long)]
    zone_id: Option<String>,

    /// 既存の ACM 証明書 ARN (AWS_CERTIFICATE_ARN)
    #[arg(long)]
    certificate_arn: Option<String>,

    /// 既存の CloudFront ディストリビューション ID (AWS_CLOUDFRONT_ID)
    #[arg(long)]
    distribution_id: Option<String>,

    /// index.html と 404.html のあるディレクトリ (SITE_ASSETS_DIR)
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// 読み込む .env ファイル (省略時はカレントディレクトリの .env)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// 既存ディストリビューションでもエイリアスレコードを UPSERT する (SITE_REPAIR_ALIAS)
    #[arg(long)]
    repair_alias: bool,

    /// DNS の管理方法: route53 / external (SITE_DNS)
    #[arg(long)]
    dns: Option<String>,
}

impl SiteArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            domain: self.domain.clone(),
            region: self.region.clone(),
            zone_id: self.zone_id.clone(),
            certificate_arn: self.certificate_arn.clone(),
            distribution_id: self.distribution_id.clone(),
            assets_dir: self.assets_dir.clone(),
            repair_alias: self.repair_alias,
            dns: self.dns.clone(),
        }
    }

    fn load(&self) -> Result<siteflow_config::SiteConfig, ConfigError> {
        siteflow_config::load_with(self.env_file.as_deref(), &self.overrides())
    }
}

/// 通常のログは stderr、進捗表示は stdout
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Version => {
            println!("siteflow {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Up { site, json } => {
            let config = site.load()?;
            commands::up::handle(&config, json).await
        }
        Commands::Plan { site, json } => {
            let config = site.load()?;
            commands::plan::handle(&config, json).await
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        EXIT_CONFIG
    } else {
        EXIT_UNEXPECTED
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "エラー:".red().bold(), e);
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_site_args_become_overrides() {
        let cli = Cli::parse_from([
            "site",
            "up",
            "--domain",
            "www.example.com",
            "--zone-id",
            "Z0001EXAMPLE",
            "--repair-alias",
            "--dns",
            "external",
        ]);
        let Commands::Up { site, json } = cli.command else {
            panic!("expected up");
        };
        assert!(!json);
        let overrides = site.overrides();
        assert_eq!(overrides.domain.as_deref(), Some("www.example.com"));
        assert_eq!(overrides.zone_id.as_deref(), Some("Z0001EXAMPLE"));
        assert!(overrides.repair_alias);
        assert_eq!(overrides.dns.as_deref(), Some("external"));
        assert_eq!(overrides.region, None);
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["site", "plan", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_config_errors_map_to_exit_78() {
        let err = anyhow::Error::from(ConfigError::MissingKey("SITE_FQDN".to_string()));
        assert_eq!(exit_code_for(&err), 78);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), 1);
    }
}
