use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "{0} が設定されていません。.env ファイル、環境変数、またはコマンドラインオプションで指定してください"
    )]
    MissingKey(String),

    #[error("{key} の値が不正です ({value:?}): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("設定の読み込みに失敗しました: {0}")]
    Load(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
