use clap::Parser;
use romaji_dropdown::{cli, config, error, logging, report, source};
use cli::{Cli, Commands};
use config::Config;
use error::{Result, RomajiDropdownError};
use romaji_dropdown_common::{DisplayComparator, DropdownConfig};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            catalog,
            format,
            output,
            preset,
            policy,
            no_promotion,
            sort,
            strategy,
            wait,
            max_retries,
        } => {
            let mut dropdown = match preset {
                Some(name) => DropdownConfig::from_preset(&name)
                    .ok_or(RomajiDropdownError::UnknownPreset(name))?,
                None => config.dropdown.clone(),
            };
            if let Some(policy) = policy {
                dropdown.classifier.name_policy = policy;
            }
            if no_promotion {
                dropdown.classifier.enable_promotion = false;
            }
            if let Some(strategy) = strategy {
                dropdown.classifier.comparator = strategy;
            }
            if max_retries.is_some() {
                dropdown.retry.max_empty_catalog_retries = max_retries;
            }

            let catalog_data = source::read_catalog(&catalog, wait, &dropdown.retry).await?;
            let report = report::ClassifyReport::build(&catalog_data, &dropdown.classifier, sort);
            eprintln!("✔ {}", report.summary());

            let rendered = report.render(format.unwrap_or(config.output_format))?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    eprintln!("✔ 結果を保存: {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Compare { a, b, romaji, strategy } => {
            let membership: HashSet<String> = romaji.into_iter().collect();
            let comparator = DisplayComparator::new(strategy, Arc::new(membership));
            println!("{}", comparator.sign(&a, &b));
        }

        Commands::Config { preset, reset, show } => {
            let mut config = config;
            let path = match cli.config {
                Some(path) => path,
                None => Config::config_path()?,
            };

            if reset {
                config = Config::default();
                config.save_to(&path)?;
                println!("✔ 設定を既定値に戻しました");
            }

            if let Some(name) = preset {
                config.apply_preset(&name)?;
                config.save_to(&path)?;
                println!("✔ プリセットを適用しました: {}", name);
            }

            if show {
                let classifier = &config.dropdown.classifier;
                let retry = &config.dropdown.retry;
                println!("設定: {}", path.display());
                println!("  昇格: {}", if classifier.enable_promotion { "有効" } else { "無効" });
                println!("  収集ポリシー: {}", classifier.name_policy);
                println!("  比較方式: {}", classifier.comparator);
                println!("  出力形式: {}", config.output_format);
                println!(
                    "  待機: {}ms x {}回",
                    retry.readiness_interval_ms, retry.readiness_max_attempts
                );
                println!(
                    "  空カタログ再取得: {}ms (上限: {})",
                    retry.empty_catalog_retry_ms,
                    retry
                        .max_empty_catalog_retries
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "なし".into())
                );
                println!("  初期化再試行: {}ms", retry.init_retry_ms);
                println!("  プリセット: {}", DropdownConfig::preset_names().join(", "));
            }
        }
    }

    Ok(())
}
