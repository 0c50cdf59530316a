//! Resource container dump tool.
//!
//! Parses any supported container and writes each resource to
//! `OUT/TYPE/ID[_NAME].bin`, with non-filename-safe bytes `%XX`-escaped the
//! same way the directory loader expects them back.
//!
//! # Usage
//!
//! ```bash
//! # Sniff the format, extract everything
//! rezdump "Game Data" -o extracted/
//!
//! # Force a format and print the index as JSON
//! rezdump archive.bin --format mohawk --json
//! ```
//!
//! Exit codes: 0 on success, 1 on usage or container errors, 2 when some
//! resources failed to decode (details on stderr).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};
use serde::Serialize;

use macrez_types::rsrc::{ResourceSet, container, flags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
	/// Sniff the container format from its magic bytes
	Auto,
	/// Classic resource fork
	Rsrc,
	/// MacBinary v1/v2/v3
	Macbinary,
	/// AppleSingle / AppleDouble
	Applesingle,
	/// Mohawk archive
	Mohawk,
	/// HIRF (`IREZ`) archive
	Hirf,
	/// DC-Data index
	Dcdata,
	/// CBag archive
	Cbag,
	/// A `TYPE/ID[_NAME].bin` directory tree
	Dir,
}

#[derive(Parser)]
#[command(name = "rezdump")]
#[command(version)]
#[command(about = "Extract typed resources from Classic Mac OS containers", long_about = None)]
struct Cli {
	/// Input file (or directory with --format dir)
	input: PathBuf,

	/// Output directory; resources land in OUT/TYPE/ID[_NAME].bin
	#[arg(short, long, default_value = "rez_out")]
	output: PathBuf,

	/// Container format
	#[arg(long, value_enum, default_value_t = FormatArg::Auto)]
	format: FormatArg,

	/// Print the resource index as JSON instead of a table
	#[arg(long)]
	json: bool,

	/// Parse and list only; write nothing
	#[arg(short = 'n', long)]
	dry_run: bool,
}

#[derive(Serialize)]
struct IndexEntry {
	type_tag: macrez_types::rsrc::TypeTag,
	id: i16,
	flags: u16,
	name: String,
	size: usize,
}

fn load(cli: &Cli) -> Result<ResourceSet, String> {
	if cli.format == FormatArg::Dir {
		return container::directory::load(&cli.input).map_err(|e| e.to_string());
	}
	let data = std::fs::read(&cli.input)
		.map_err(|e| format!("cannot read {}: {e}", cli.input.display()))?;
	let result = match cli.format {
		FormatArg::Auto => container::parse_auto(&data),
		FormatArg::Rsrc => container::parse_as(&data, container::IndexFormat::ResourceFork),
		FormatArg::Macbinary => container::parse_as(&data, container::IndexFormat::MacBinary),
		FormatArg::Applesingle => container::parse_as(&data, container::IndexFormat::AppleSingle),
		FormatArg::Mohawk => container::parse_as(&data, container::IndexFormat::Mohawk),
		FormatArg::Hirf => container::parse_as(&data, container::IndexFormat::Hirf),
		FormatArg::Dcdata => container::parse_as(&data, container::IndexFormat::DcData),
		FormatArg::Cbag => container::parse_as(&data, container::IndexFormat::CBag),
		FormatArg::Dir => unreachable!(),
	};
	result.map_err(|e| e.to_string())
}

fn main() -> ExitCode {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	let mut set = match load(&cli) {
		Ok(set) => set,
		Err(message) => {
			error!("{message}");
			return ExitCode::from(1);
		}
	};

	let keys = set.all();
	info!("{} resources in {}", keys.len(), cli.input.display());

	let mut failures = 0usize;
	let mut index = Vec::with_capacity(keys.len());
	for (type_tag, id) in keys {
		let Some(res) = set.get(type_tag, id, 0) else {
			continue;
		};
		if res.flags & flags::DECOMPRESSION_FAILED != 0 {
			eprintln!("warning: {type_tag} id {id}: decompression failed; dumping raw body");
			failures += 1;
		}
		index.push(IndexEntry {
			type_tag,
			id,
			flags: res.flags,
			name: res.name.clone(),
			size: res.data.len(),
		});

		if cli.dry_run {
			continue;
		}
		let type_dir = cli
			.output
			.join(container::directory::escape_filename(&type_tag.bytes()));
		let path = type_dir.join(container::directory::filename_for_resource(res));
		let write_result =
			std::fs::create_dir_all(&type_dir).and_then(|()| std::fs::write(&path, &res.data));
		if let Err(e) = write_result {
			eprintln!("error: {type_tag} id {id}: cannot write {}: {e}", path.display());
			failures += 1;
		}
	}

	if cli.json {
		match serde_json::to_string_pretty(&index) {
			Ok(text) => println!("{text}"),
			Err(e) => {
				error!("cannot serialize index: {e}");
				return ExitCode::from(1);
			}
		}
	} else {
		for entry in &index {
			println!(
				"{} {:6} {:8} {:04X} {}",
				entry.type_tag, entry.id, entry.size, entry.flags, entry.name
			);
		}
	}

	if failures > 0 {
		ExitCode::from(2)
	} else {
		ExitCode::SUCCESS
	}
}
