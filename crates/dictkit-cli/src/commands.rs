use anyhow::bail;
use colored::Colorize;
use dictkit_merge::merge_all;
use dictkit_path::{Node, PathTree};
use dictkit_types::{Mapping, Value};

use crate::cli::*;
use crate::document::load_document;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Merge(args) => cmd_merge(args, format),
        Command::Get(args) => cmd_get(args, format),
        Command::Leaves(args) => cmd_leaves(args, format),
    }
}

fn cmd_merge(args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let merged = merge_files(&args.files, !args.keep)?;
    let value = Value::Map(merged);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value.to_json())?),
        OutputFormat::Text => {
            println!("{} Merged {} documents", "✓".green().bold(), args.files.len());
            println!("{value}");
        }
    }
    Ok(())
}

fn cmd_get(args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tree = PathTree::from_mapping(load_document(&args.file)?)?;
    let Some(value) = lookup(&tree, &args.path) else {
        bail!("no value at {} in {}", args.path, args.file);
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value.to_json())?),
        OutputFormat::Text => println!("{} = {}", args.path.cyan(), value),
    }
    Ok(())
}

fn cmd_leaves(args: LeavesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tree = PathTree::from_mapping(load_document(&args.file)?)?;
    let leaves = tree.leaves();
    match format {
        OutputFormat::Json => {
            let listing: serde_json::Map<String, serde_json::Value> = leaves
                .iter()
                .map(|(path, value)| (path.to_string(), value.to_json()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            for (path, value) in &leaves {
                println!("  {} = {}", path.to_string().cyan(), value);
            }
            println!("{} leaves", leaves.len().to_string().bold());
        }
    }
    Ok(())
}

/// Load and fold `files` in order.
fn merge_files(files: &[String], update: bool) -> anyhow::Result<Mapping> {
    let layers = files
        .iter()
        .map(|file| load_document(file))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(merge_all(&layers, update))
}

fn lookup(tree: &PathTree<Value>, path: &str) -> Option<Value> {
    match tree.get(path)? {
        Node::Leaf(value) => Some(value.clone()),
        Node::Tree(subtree) => Some(subtree.to_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    fn fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn later_files_win_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let base = fixture(&dir, "base.json", r#"{"port": 80, "tags": ["a"]}"#);
        let over = fixture(&dir, "over.toml", "port = 8080\ntags = [\"b\"]\n");

        let merged = merge_files(&[base.clone(), over.clone()], true).unwrap();
        assert_eq!(merged["port"].as_i64(), Some(8080));
        assert_eq!(merged["tags"].as_list().unwrap().len(), 2);

        let kept = merge_files(&[base, over], false).unwrap();
        assert_eq!(kept["port"].as_i64(), Some(80));
    }

    #[test]
    fn lookup_returns_leaves_and_subtrees() {
        let dir = tempfile::tempdir().unwrap();
        let file = fixture(&dir, "cfg.json", r#"{"server": {"port": 1, "host": "h"}}"#);
        let tree = PathTree::from_mapping(load_document(&file).unwrap()).unwrap();

        assert_eq!(lookup(&tree, "server/port"), Some(Value::from(1i64)));
        let server = lookup(&tree, "server").unwrap();
        assert_eq!(server.as_map().unwrap().len(), 2);
        assert_eq!(lookup(&tree, "server/port/deeper"), None);
    }

    #[test]
    fn commands_run_against_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = fixture(&dir, "cfg.json", r#"{"a": {"b": true}}"#);

        for argv in [
            vec!["dictkit", "merge", file.as_str(), file.as_str()],
            vec!["dictkit", "get", file.as_str(), "a/b"],
            vec!["dictkit", "--format", "json", "leaves", file.as_str()],
        ] {
            let cli = Cli::try_parse_from(argv).unwrap();
            run_command(cli).unwrap();
        }
    }

    #[test]
    fn listed_leaf_paths_can_be_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = fixture(&dir, "cfg.json", r#"{"a/b": 1, "c": {"d": 2}}"#);
        let tree = PathTree::from_mapping(load_document(&file).unwrap()).unwrap();

        let listed: Vec<String> = tree.leaves().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(listed, vec!["a/b", "c/d"]);
        for path in &listed {
            assert!(lookup(&tree, path).is_some(), "{path} should resolve");
        }

        let cli = Cli::try_parse_from(["dictkit", "get", file.as_str(), "a/b"]).unwrap();
        run_command(cli).unwrap();
    }

    #[test]
    fn get_fails_on_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = fixture(&dir, "cfg.json", r#"{"a": 1}"#);
        let cli = Cli::try_parse_from(["dictkit", "get", file.as_str(), "missing"]).unwrap();
        let err = run_command(cli).unwrap_err();
        assert!(err.to_string().contains("no value at missing"));
    }
}
