use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use survey_reconcile::{cli, config, loader, matcher, pipeline};
use survey_reconcile_common::{
    group_fields, visible_fields, CanonicalFieldCatalog, EmployeeRecord, ReconcilerOptions, DEFAULT_GROUP_ORDER,
};
use cli::{Cli, Commands};
use config::Config;
use matcher::{IdentityCandidate, IdentityMatcher};
use pipeline::PipelineOptions;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;

    match cli.command {
        Commands::Reconcile { input, output, report, images, threshold, name_threshold, catalog } => {
            println!("📋 survey-reconcile - ヘッダー照合\n");

            if let Some(t) = threshold {
                config.header_threshold = t;
            }
            if let Some(t) = name_threshold {
                config.name_threshold = t;
            }
            if catalog.is_some() {
                config.catalog_path = catalog;
            }
            config.validate()?;
            let catalog = load_catalog(&config)?;

            // 1. 読み込み
            println!("[1/3] ファイルを読み込み中...");
            let table = loader::load_table(&input)?;
            println!("✔ {}列 / {}行を検出\n", table.labels.len(), table.rows.len());

            // 2. 照合
            println!("[2/3] ヘッダー照合中...");
            let options = PipelineOptions {
                reconciler: ReconcilerOptions {
                    fuzzy_threshold: config.header_threshold,
                    ..ReconcilerOptions::default()
                },
                required_key: config.required_key.clone(),
            };
            let mut result = pipeline::process_table(&table, &catalog, &options);
            println!("✔ {}件のレコードを抽出", result.records.len());
            if !result.skipped.is_empty() {
                println!("  除外: {}行", result.skipped.len());
            }
            if !result.displaced.is_empty() {
                println!("  競合で外れた列: {}列", result.displaced.len());
            }
            println!();

            if report {
                print_report(&result.report);
            }

            // 3. 画像照合
            let image_dir = images.or_else(|| config.image_dir.clone());
            match image_dir {
                Some(dir) => {
                    println!("[3/3] 人物画像を照合中...");
                    let stats = bind_images(&mut result.records, &dir, &config)?;
                    println!("✔ {}/{}件の画像を照合\n", stats.matched, stats.total);
                }
                None => println!("[3/3] 画像フォルダ未指定のため画像照合をスキップ\n"),
            }

            write_json(&result, output.as_deref())?;
            println!("\n✅ 完了");
        }

        Commands::Headers { input, threshold, json, catalog } => {
            if let Some(t) = threshold {
                config.header_threshold = t;
            }
            if catalog.is_some() {
                config.catalog_path = catalog;
            }
            config.validate()?;
            let catalog = load_catalog(&config)?;

            let table = loader::load_table(&input)?;
            let reconciler = survey_reconcile_common::HeaderReconciler::new(
                &catalog,
                ReconcilerOptions {
                    fuzzy_threshold: config.header_threshold,
                    ..ReconcilerOptions::default()
                },
            );
            let map = reconciler.reconcile(&table.labels, table.sample_row());

            if json {
                println!("{}", serde_json::to_string_pretty(&map.report())?);
            } else {
                print_report(&map.report());

                for displaced in map.displaced() {
                    println!(
                        "  ⚠ 列{} \"{}\" は {} を列{}に譲りました",
                        displaced.column_position, displaced.column_label, displaced.canonical_key, displaced.winner_position
                    );
                }

                println!("\nグループ別:");
                let groups = group_fields(&map);
                for group in DEFAULT_GROUP_ORDER {
                    if let Some(fields) = groups.get(&group) {
                        let keys: Vec<&str> = fields.iter().map(|m| m.canonical_key.as_str()).collect();
                        println!("  {:?}: {}", group, keys.join(", "));
                    }
                }

                let card: Vec<&str> = visible_fields(&map, &DEFAULT_GROUP_ORDER)
                    .iter()
                    .map(|m| m.canonical_key.as_str())
                    .collect();
                println!("\nカード表示 ({}列): {}", card.len(), card.join(", "));
            }
        }

        Commands::Legacy { dir, output, images } => {
            println!("📝 survey-reconcile - 旧形式回答の読み込み\n");

            println!("[1/2] 回答ファイルを読み込み中...");
            let mut batch = loader::load_survey_directory(&dir)?;
            println!("✔ {}件のレコードを読み込み", batch.records.len());
            if !batch.ignored_files.is_empty() {
                println!("  命名規則外: {}件", batch.ignored_files.len());
            }
            if !batch.rejected_files.is_empty() {
                println!("  回答者名なし: {}件", batch.rejected_files.len());
            }
            println!();

            match images.or_else(|| config.image_dir.clone()) {
                Some(image_dir) => {
                    println!("[2/2] 人物画像を照合中...");
                    let stats = bind_images(&mut batch.records, &image_dir, &config)?;
                    println!("✔ {}/{}件の画像を照合\n", stats.matched, stats.total);
                }
                None => println!("[2/2] 画像フォルダ未指定のため画像照合をスキップ\n"),
            }

            write_json(&batch.records, output.as_deref())?;
            println!("\n✅ 完了");
        }

        Commands::Match { name, images, name_threshold } => {
            let image_dir = images
                .or_else(|| config.image_dir.clone())
                .context("画像フォルダを --images か設定で指定してください")?;
            let threshold = name_threshold.unwrap_or(config.name_threshold);

            let candidates = matcher::candidates_from_directory(&image_dir)?;
            let identity = IdentityMatcher::new(threshold);

            println!("名前: {} → \"{}\"", name, matcher::normalize_name(&name));
            println!("候補: {}件 / 閾値: {}\n", candidates.len(), identity.threshold());
            for (candidate, score) in identity.ranked(&name, &candidates) {
                println!("  {:>3}  {} (\"{}\")", score, candidate.filename, candidate.normalized_name);
            }

            let result = identity.best_match(&name, &candidates);
            match (result.candidate_filename(), result.confidence_score()) {
                (Some(filename), Some(score)) => println!("\n✔ 照合: {} ({})", filename, score),
                _ => println!("\n✘ 閾値以上の候補がありません"),
            }
        }

        Commands::Config { show, set_image_dir, set_threshold, set_name_threshold, set_catalog, dump_catalog } => {
            let changed = set_image_dir.is_some()
                || set_threshold.is_some()
                || set_name_threshold.is_some()
                || set_catalog.is_some();

            if let Some(dir) = set_image_dir {
                config.image_dir = Some(dir);
            }
            if let Some(t) = set_threshold {
                config.header_threshold = t;
            }
            if let Some(t) = set_name_threshold {
                config.name_threshold = t;
            }
            if let Some(path) = set_catalog {
                // 保存前に読めることを確認
                CanonicalFieldCatalog::from_file(&path)
                    .with_context(|| format!("カタログを読み込めません: {}", path.display()))?;
                config.catalog_path = Some(path);
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if let Some(path) = dump_catalog {
                std::fs::write(&path, CanonicalFieldCatalog::shared().to_json()?)
                    .with_context(|| format!("書き込みに失敗: {}", path.display()))?;
                println!("✔ 組み込みカタログを書き出しました: {}", path.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  ヘッダー閾値: {}", config.header_threshold);
                println!("  名前閾値: {}", config.name_threshold);
                println!("  必須キー: {}", config.required_key);
                println!("  名前キー: {}", config.name_key);
                println!("  画像フォルダ: {}", display_or_unset(config.image_dir.as_deref()));
                println!("  カタログ: {}", display_or_unset(config.catalog_path.as_deref()));
            }
        }
    }

    Ok(())
}

/// RUST_LOG があればそれに従い、無ければ -v で debug、通常は warn
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(config: &Config) -> Result<CanonicalFieldCatalog> {
    match &config.catalog_path {
        Some(path) => CanonicalFieldCatalog::from_file(path)
            .with_context(|| format!("カタログを読み込めません: {}", path.display())),
        None => Ok(CanonicalFieldCatalog::shared().clone()),
    }
}

fn bind_images(records: &mut [EmployeeRecord], dir: &Path, config: &Config) -> Result<pipeline::ImageBindingStats> {
    let candidates: Vec<IdentityCandidate> = matcher::candidates_from_directory(dir)?;
    let identity = IdentityMatcher::new(config.name_threshold);
    Ok(pipeline::bind_images(records, &candidates, &identity, &config.name_key))
}

fn print_report(report: &[survey_reconcile_common::ReportEntry]) {
    println!("照合レポート:");
    for entry in report {
        println!(
            "  {:>3} {:<3} {:<40} → {:<45} {:?}",
            entry.column_position,
            entry.column_letter,
            truncate(&entry.original_label, 40),
            entry.canonical_key,
            entry.match_kind
        );
    }
    println!();
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("書き込みに失敗: {}", path.display()))?;
            println!("✔ 結果を保存: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn display_or_unset(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "未設定".to_string())
}
