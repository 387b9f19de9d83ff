//! CLI entry point for wayfare_desc.
//! Usage: cargo run -p wayfare_desc -- compile content/world/forest.desc

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use wayfare_desc::{parse_file, to_json_string};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Accept either:
    // 1) cargo run: <bin> -- <cmd> <args>
    // 2) direct:    <bin> <cmd> <args>
    let rest: Vec<String> = match args.as_slice() {
        [_, flag, cmd, tail @ ..] if flag == "--" && (cmd == "compile" || cmd == "check") => {
            let mut v = vec![cmd.clone()];
            v.extend_from_slice(tail);
            v
        },
        [_, cmd, tail @ ..] if cmd == "compile" || cmd == "check" => {
            let mut v = vec![cmd.clone()];
            v.extend_from_slice(tail);
            v
        },
        _ => {
            eprintln!(
                "Usage:\n  wayfare_desc compile <file.desc | dir> [--out <path>] [--force]\n  wayfare_desc check <file.desc | dir>"
            );
            process::exit(2);
        },
    };
    let cmd = &rest[0];
    if cmd == "compile" {
        run_compile(&rest[1..]);
    } else if cmd == "check" {
        run_check(&rest[1..]);
    } else {
        eprintln!("unknown command: {}", cmd);
        process::exit(2);
    }
}

fn run_compile(args: &[String]) {
    let mut path: Option<String> = None;
    let mut out_path: Option<String> = None;
    let mut force = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                if i + 1 >= args.len() {
                    eprintln!("--out requires a filepath");
                    process::exit(2);
                }
                out_path = Some(args[i + 1].clone());
                i += 2;
                continue;
            },
            "--force" => {
                force = true;
                i += 1;
                continue;
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
        eprintln!("Usage: wayfare_desc compile <file.desc | dir> [--out <path>] [--force]");
        process::exit(2);
    };
    let md = fs::metadata(&path).unwrap_or_else(|e| {
        eprintln!("error: stat '{}': {}", &path, e);
        process::exit(1);
    });
    if md.is_dir() {
        let Some(out_dir) = out_path else {
            eprintln!("compiling a directory requires --out <dir>");
            process::exit(2);
        };
        compile_dir(Path::new(&path), Path::new(&out_dir), force);
    } else {
        compile_file(Path::new(&path), out_path.as_deref().map(Path::new));
    }
}

fn compile_file(path: &Path, out_path: Option<&Path>) {
    let output = parse_file(path).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        process::exit(1);
    });
    for w in &output.warnings {
        eprintln!("{}:{}: {}", path.display(), w.line, w.message);
    }
    let json = to_json_string(&output.root);
    if let Some(out) = out_path {
        fs::write(out, json + "\n").unwrap_or_else(|e| {
            eprintln!("error: writing '{}': {}", out.display(), e);
            process::exit(1);
        });
    } else {
        println!("{}", json);
    }
}

fn compile_dir(src_dir: &Path, out_dir: &Path, force: bool) {
    let mut files = Vec::new();
    collect_desc_files_recursive(src_dir, &mut files);
    if files.is_empty() {
        eprintln!("compile: no .desc files in directory '{}'", src_dir.display());
    }
    files.sort();

    let mut compiled = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for file in files {
        let rel = file.strip_prefix(src_dir).unwrap_or(&file);
        let dest = out_dir.join(rel).with_extension("json");
        if !force && output_is_fresh(&file, &dest) {
            skipped += 1;
            continue;
        }
        let output = match parse_file(&file) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("error: {}", e);
                failed += 1;
                continue;
            },
        };
        for w in &output.warnings {
            eprintln!("{}:{}: {}", file.display(), w.line, w.message);
        }
        if let Some(parent) = dest.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            eprintln!("error: creating '{}': {}", parent.display(), e);
            failed += 1;
            continue;
        }
        match fs::write(&dest, to_json_string(&output.root) + "\n") {
            Ok(()) => compiled += 1,
            Err(e) => {
                eprintln!("error: writing '{}': {}", dest.display(), e);
                failed += 1;
            },
        }
    }
    eprintln!("compile: {} compiled, {} skipped, {} failed", compiled, skipped, failed);
    if failed > 0 {
        process::exit(1);
    }
}

/// Incremental skip: the output exists and is at least as new as the input.
fn output_is_fresh(src: &Path, dest: &Path) -> bool {
    let src_mtime = fs::metadata(src).and_then(|m| m.modified());
    let dest_mtime = fs::metadata(dest).and_then(|m| m.modified());
    match (src_mtime, dest_mtime) {
        (Ok(s), Ok(d)) => d >= s,
        _ => false,
    }
}

fn run_check(args: &[String]) {
    let mut path: Option<String> = None;
    for a in args {
        if path.is_none() && !a.starts_with("--") {
            path = Some(a.clone());
        }
    }
    let Some(path) = path else {
        eprintln!("Usage: wayfare_desc check <file.desc | dir>");
        process::exit(2);
    };
    let md = fs::metadata(&path).unwrap_or_else(|e| {
        eprintln!("error: stat '{}': {}", &path, e);
        process::exit(1);
    });
    let mut files = Vec::new();
    if md.is_dir() {
        collect_desc_files_recursive(Path::new(&path), &mut files);
        if files.is_empty() {
            eprintln!("check: no .desc files in directory '{}'", &path);
        }
        files.sort();
    } else {
        files.push(PathBuf::from(&path));
    }

    let mut ok = 0usize;
    let mut failed = 0usize;
    for file in files {
        match parse_file(&file) {
            Ok(output) => {
                for w in &output.warnings {
                    eprintln!("{}:{}: {}", file.display(), w.line, w.message);
                }
                ok += 1;
            },
            Err(e) => {
                eprintln!("error: {}", e);
                failed += 1;
            },
        }
    }
    eprintln!("check: {} ok, {} failed", ok, failed);
    if failed > 0 {
        process::exit(1);
    }
}

fn collect_desc_files_recursive(dir: &Path, out: &mut Vec<PathBuf>) {
    if let Ok(rd) = fs::read_dir(dir) {
        for ent in rd.flatten() {
            let p = ent.path();
            if p.is_dir() {
                collect_desc_files_recursive(&p, out);
                continue;
            }
            if p.extension().and_then(|e| e.to_str()) == Some("desc") {
                out.push(p);
            }
        }
    }
}
