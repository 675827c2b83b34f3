use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "survey-reconcile")]
#[command(about = "評価アンケート出力のヘッダー照合・人物画像照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 表計算ファイルを照合してレコードJSONを出力
    Reconcile {
        /// 入力ファイル（xlsx/xlsm/xls/ods/csv）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 照合レポートも表示
        #[arg(long)]
        report: bool,

        /// 人物画像フォルダ（設定値より優先）
        #[arg(long)]
        images: Option<PathBuf>,

        /// ヘッダー曖昧一致の閾値（0.0-1.0）
        #[arg(long)]
        threshold: Option<f64>,

        /// 名前照合の閾値（0-100）
        #[arg(long)]
        name_threshold: Option<u8>,

        /// カスタムカタログJSON
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// ヘッダー照合レポートのみ表示
    Headers {
        /// 入力ファイル
        #[arg(required = true)]
        input: PathBuf,

        /// ヘッダー曖昧一致の閾値（0.0-1.0）
        #[arg(long)]
        threshold: Option<f64>,

        /// JSONで出力
        #[arg(long)]
        json: bool,

        /// カスタムカタログJSON
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// 旧形式テキスト回答フォルダを読み込み
    Legacy {
        /// 回答ファイルのフォルダ
        #[arg(required = true)]
        dir: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 人物画像フォルダ（設定値より優先）
        #[arg(long)]
        images: Option<PathBuf>,
    },

    /// 名前と画像の照合を診断
    Match {
        /// 照合する名前
        #[arg(required = true)]
        name: String,

        /// 人物画像フォルダ（設定値より優先）
        #[arg(long)]
        images: Option<PathBuf>,

        /// 名前照合の閾値（0-100）
        #[arg(long)]
        name_threshold: Option<u8>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 人物画像フォルダを設定
        #[arg(long)]
        set_image_dir: Option<PathBuf>,

        /// ヘッダー曖昧一致の閾値を設定
        #[arg(long)]
        set_threshold: Option<f64>,

        /// 名前照合の閾値を設定
        #[arg(long)]
        set_name_threshold: Option<u8>,

        /// カスタムカタログJSONを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 組み込みカタログをJSONで書き出す
        #[arg(long)]
        dump_catalog: Option<PathBuf>,
    },
}
