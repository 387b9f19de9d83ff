//! Reverse conversion utility for existing compiled game data.
//!
//! Reads the engine's JSON content and emits approximate `.desc` authoring
//! text to help bootstrap hand-editing of worlds that were first written as
//! raw JSON. Entity tags are not recorded in compiled data, so top-level
//! entities are emitted with a caller-chosen tag (`--tag`, default `ENTITY`).
//! Trees that did not come from well-formed `.desc` input may not convert
//! exactly.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use wayfare_desc::{from_json, write_document};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let mut path: Option<String> = None;
    let mut out_path: Option<String> = None;
    let mut tag = "ENTITY".to_string();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                if i + 1 >= args.len() {
                    eprintln!("--out requires a path");
                    process::exit(2);
                }
                out_path = Some(args[i + 1].clone());
                i += 2;
                continue;
            },
            "--tag" => {
                if i + 1 >= args.len() {
                    eprintln!("--tag requires an entity tag");
                    process::exit(2);
                }
                tag = args[i + 1].clone();
                i += 2;
                continue;
            },
            "--" => {
                i += 1;
            },
            s => {
                if path.is_none() {
                    path = Some(s.to_string());
                }
                i += 1;
            },
        }
    }
    let Some(path) = path else {
        eprintln!("Usage: rev_json_to_desc <file.json | dir> [--out <path>] [--tag <ENTITY_TAG>]");
        process::exit(2);
    };
    let md = fs::metadata(&path).unwrap_or_else(|e| {
        eprintln!("error: stat '{}': {}", &path, e);
        process::exit(1);
    });
    if md.is_dir() {
        let Some(out_dir) = out_path else {
            eprintln!("converting a directory requires --out <dir>");
            process::exit(2);
        };
        convert_dir(Path::new(&path), Path::new(&out_dir), &tag);
    } else {
        convert_file(Path::new(&path), out_path.as_deref().map(Path::new), &tag);
    }
}

fn convert_file(path: &Path, out_path: Option<&Path>, tag: &str) {
    let text = match render_file(path, tag) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        },
    };
    if let Some(out) = out_path {
        fs::write(out, text).unwrap_or_else(|e| {
            eprintln!("error: writing '{}': {}", out.display(), e);
            process::exit(1);
        });
    } else {
        print!("{}", text);
    }
}

fn convert_dir(src_dir: &Path, out_dir: &Path, tag: &str) {
    let mut files = Vec::new();
    collect_json_files_recursive(src_dir, &mut files);
    if files.is_empty() {
        eprintln!("rev: no .json files in directory '{}'", src_dir.display());
    }
    files.sort();

    let mut converted = 0usize;
    let mut failed = 0usize;
    for file in files {
        let rel = file.strip_prefix(src_dir).unwrap_or(&file);
        let dest = out_dir.join(rel).with_extension("desc");
        let text = match render_file(&file, tag) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("error: {}", e);
                failed += 1;
                continue;
            },
        };
        if let Some(parent) = dest.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            eprintln!("error: creating '{}': {}", parent.display(), e);
            failed += 1;
            continue;
        }
        match fs::write(&dest, text) {
            Ok(()) => converted += 1,
            Err(e) => {
                eprintln!("error: writing '{}': {}", dest.display(), e);
                failed += 1;
            },
        }
    }
    eprintln!("rev: {} converted, {} failed", converted, failed);
    if failed > 0 {
        process::exit(1);
    }
}

fn render_file(path: &Path, tag: &str) -> Result<String, String> {
    let src = fs::read_to_string(path).map_err(|e| format!("reading '{}': {}", path.display(), e))?;
    let decoded: serde_json::Value =
        serde_json::from_str(&src).map_err(|e| format!("decoding '{}': {}", path.display(), e))?;
    Ok(write_document(&from_json(decoded), tag))
}

fn collect_json_files_recursive(dir: &Path, out: &mut Vec<PathBuf>) {
    if let Ok(rd) = fs::read_dir(dir) {
        for ent in rd.flatten() {
            let p = ent.path();
            if p.is_dir() {
                collect_json_files_recursive(&p, out);
                continue;
            }
            if p.extension().and_then(|e| e.to_str()) == Some("json") {
                out.push(p);
            }
        }
    }
}
