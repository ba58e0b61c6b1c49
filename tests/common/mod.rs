//! Fixture archives for integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

pub const HEADER: &str =
    "Nome Completo;Apelido;Clube;Idade;Data Nascimento;Contrato;Início;Data;Inscrição;CBF";

/// One semicolon row in `HEADER` order; the id columns are derived from the name.
pub fn row(name: &str, nickname: &str, team: &str, record_date: &str, start_date: &str) -> String {
    let id = name.replace(' ', "-");
    format!("{name};{nickname};{team};25;2000-01-01;C-{id};{start_date};{record_date};R-{id};F-{id}")
}

pub fn table(rows: &[String]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

/// Write a zip at `dir/name` holding the given `(entry name, contents)` members, uncompressed.
pub fn write_archive(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("archive should be creatable");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (entry, bytes) in entries {
        zip.start_file(*entry, options).expect("entry should start");
        zip.write_all(bytes).expect("entry should be written");
    }
    zip.finish().expect("archive should finish");
    path
}

/// Archive with a single `bid.csv` member built from `rows`.
pub fn write_roster(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
    let text = table(rows);
    write_archive(dir, name, &[("bid.csv", text.as_bytes())])
}
