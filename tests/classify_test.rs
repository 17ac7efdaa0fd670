//! 分類の統合テスト
//!
//! 公開APIだけを使って分類・比較・レポートの性質を検証

use romaji_dropdown::cli::OutputFormat;
use romaji_dropdown::report::ClassifyReport;
use romaji_dropdown::source::read_catalog;
use romaji_dropdown_common::{
    classify, compare_for_display, Catalog, ClassifierConfig, DropdownConfig, NamePolicy,
    NameVariant, RetryPolicy, TitledEntry,
};
use std::cmp::Ordering;
use std::collections::HashSet;
use tempfile::tempdir;

fn entry(names: &[(&str, &str)]) -> TitledEntry {
    TitledEntry::with_names(
        names
            .iter()
            .map(|(lang, name)| NameVariant::new(*lang, *name))
            .collect(),
    )
}

/// 検証用のカタログ群（昇格・重複・欠落を含む）
fn sample_catalogs() -> Vec<Catalog> {
    vec![
        Catalog::new(),
        Catalog::from_entries(vec![entry(&[("JA", "Example Title: Part Two"), ("EN", "Example Title")])]),
        Catalog::from_entries(vec![
            entry(&[("JA", "Shingeki no Kyojin"), ("EN", "Attack on Titan")]),
            entry(&[("JA", "Shingeki no Kyojin Season 2"), ("EN", "Shingeki no Kyojin")]),
            entry(&[("JA", "K-On!"), ("EN", "K-On!")]),
            entry(&[("EN", "Attack on Titan"), ("FR", "L'Attaque des Titans")]),
            TitledEntry::default(),
        ]),
        Catalog::from_entries(vec![
            entry(&[("EN", "Naruto"), ("JA", "Naruto Shippuuden")]),
            entry(&[("EN", "Bleach"), ("JA", "Bleach: Sennen Kessen-hen")]),
            entry(&[("EN", "Bleach")]),
            entry(&[("JA", ""), ("EN", "")]),
            entry(&[("ja", "Lowercase Tag")]),
        ]),
    ]
}

fn configs() -> Vec<ClassifierConfig> {
    let mut out = Vec::new();
    for policy in [NamePolicy::Independent, NamePolicy::RomajiWins] {
        for enable_promotion in [true, false] {
            out.push(ClassifierConfig {
                enable_promotion,
                name_policy: policy,
                ..Default::default()
            });
        }
    }
    out
}

/// ローマ字集合と英語集合は常に互いに素
#[test]
fn test_sets_are_disjoint() {
    for catalog in sample_catalogs() {
        for config in configs() {
            let result = classify(&catalog, &config);
            for name in &result.english {
                assert!(!result.romaji.contains(name), "{} が両方にある ({:?})", name, config);
            }
        }
    }
}

/// JAタグの表記はすべてローマ字集合に入る
#[test]
fn test_every_romaji_variant_collected() {
    for catalog in sample_catalogs() {
        for config in configs() {
            let result = classify(&catalog, &config);
            for entry in catalog.entries() {
                for variant in entry.variants() {
                    if let (Some(text), "JA") = (variant.text(), variant.language.as_str()) {
                        assert!(result.romaji.contains(text));
                    }
                }
            }
        }
    }
}

/// 出力リストの長さは集合サイズの和で、重複がない
#[test]
fn test_list_has_no_duplicates() {
    for catalog in sample_catalogs() {
        for config in configs() {
            let result = classify(&catalog, &config);
            let list = result.ordered_list();
            assert_eq!(list.len(), result.romaji.len() + result.english.len());

            let unique: HashSet<&String> = list.iter().collect();
            assert_eq!(unique.len(), list.len());
        }
    }
}

/// 同じカタログを2回分類しても集合の中身は変わらない
#[test]
fn test_classify_idempotent() {
    let config = ClassifierConfig::default();
    for catalog in sample_catalogs() {
        let first = classify(&catalog, &config);
        let second = classify(&catalog, &config);

        let values = |names: Vec<String>| names.into_iter().collect::<HashSet<_>>();
        assert_eq!(
            values(first.romaji.iter().cloned().collect()),
            values(second.romaji.iter().cloned().collect())
        );
        assert_eq!(
            values(first.english.iter().cloned().collect()),
            values(second.english.iter().cloned().collect())
        );
    }
}

/// 区切り付き接頭辞の英語表記は昇格し、無関係なら残る
#[test]
fn test_promotion_trigger_and_non_trigger() {
    let config = ClassifierConfig::default();

    let promoted = classify(
        &Catalog::from_entries(vec![entry(&[("JA", "Example Title: Part Two"), ("EN", "Example Title")])]),
        &config,
    );
    assert!(promoted.romaji.contains("Example Title"));
    assert!(promoted.english.is_empty());
    assert_eq!(promoted.promoted, 1);

    let untouched = classify(
        &Catalog::from_entries(vec![entry(&[("JA", "Unrelated Show"), ("EN", "Example Title")])]),
        &config,
    );
    assert_eq!(untouched.english.len(), 1);
    assert!(untouched.english.contains("Example Title"));
    assert_eq!(untouched.promoted, 0);
}

/// 英語表記がローマ字表記と完全一致する場合は英語側から消える
#[test]
fn test_exact_match_kept_only_as_romaji() {
    let catalog = Catalog::from_entries(vec![entry(&[("JA", "Monster"), ("EN", "Monster")])]);

    for config in configs() {
        let result = classify(&catalog, &config);
        assert_eq!(result.ordered_list(), vec!["Monster"], "{:?}", config);
        assert!(result.english.is_empty());
    }
}

#[test]
fn test_comparator_properties() {
    let romaji: HashSet<String> = ["Example Title".to_string()].into_iter().collect();
    assert_eq!(
        compare_for_display("Example Title", "Another Anime", &romaji),
        Ordering::Less
    );
    assert_eq!(
        compare_for_display("Ab", "Abc", &HashSet::new()),
        Ordering::Less
    );
    assert_eq!(compare_for_display("Ab", "Ab", &HashSet::new()), Ordering::Equal);
}

/// 空カタログは空の結果でエラーにならない
#[test]
fn test_empty_catalog() {
    let result = classify(&Catalog::new(), &ClassifierConfig::default());
    assert!(result.ordered_list().is_empty());
    assert!(result.romaji.is_empty());
    assert!(result.english.is_empty());
}

/// 欠落・未知の言語タグは無視される
#[test]
fn test_malformed_entries_skipped() {
    let json = r#"{
        "1": {},
        "2": {"names": null},
        "3": {"names": [{"language": "JA"}, {"language": "KO", "name": "Other"}]},
        "4": {"names": [{"language": "EN", "name": ""}]}
    }"#;
    let catalog = Catalog::from_json(json).expect("パース失敗");
    let result = classify(&catalog, &ClassifierConfig::default());
    assert!(result.is_empty());
}

/// 旧版プリセットではJA優先・昇格なし
#[test]
fn test_legacy_preset_report() {
    let catalog = Catalog::from_entries(vec![
        entry(&[("JA", "Example Title: Part Two"), ("EN", "Example Title")]),
        entry(&[("EN", "Zzz")]),
    ]);
    let config = DropdownConfig::from_preset("romaji-first").expect("プリセットがない");

    let report = ClassifyReport::build(&catalog, &config.classifier, true);
    assert_eq!(report.promoted, 0);
    // host-default は並べ替えても順序を変えない
    assert_eq!(report.list, vec!["Example Title: Part Two", "Example Title", "Zzz"]);
}

/// ファイルからの読み込みとJSON出力
#[tokio::test]
async fn test_classify_from_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"[
            {"names": [{"language": "JA", "name": "Kimi no Na wa."}, {"language": "EN", "name": "Your Name."}]},
            {"names": [{"language": "JA", "name": "Mushishi Zoku Shou: Suzu no Shizuku"}, {"language": "EN", "name": "Mushishi"}]}
        ]"#,
    )
    .unwrap();

    let catalog = read_catalog(&path, false, &RetryPolicy::default())
        .await
        .expect("読み込み失敗");
    let report = ClassifyReport::build(&catalog, &ClassifierConfig::default(), true);

    assert_eq!(report.promoted, 1);
    assert_eq!(report.english, vec!["Your Name."]);
    assert_eq!(report.list.last().map(String::as_str), Some("Your Name."));

    let json = report.render(OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["list"].as_array().map(|a| a.len()), Some(4));
}
