//! Resource rendering tool.
//!
//! Decodes image-bearing resources (`PICT`, the icon/cursor/pattern
//! families, palettes, font strikes) out of a container and saves them as
//! PNG files. QuickTime payloads embedded in `PICT`s are written unchanged
//! under their codec extension.
//!
//! # Usage
//!
//! ```bash
//! # Render every PICT
//! rezrender "Game Data" --type PICT -o rendered/
//!
//! # Render one icon family member
//! rezrender System --type icl8 --id 128
//! ```
//!
//! Exit codes: 0 on success, 1 on usage/container errors, 2 when some
//! resources failed to decode (details on stderr).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use macrez_types::rsrc::{
	ResourceSet, TypeTag, container,
	font::{self, renderer::BitmapFontRenderer, renderer::HorizontalAlignment},
	image::{Image, icons, palette, pict},
	tags,
};

#[derive(Parser)]
#[command(name = "rezrender")]
#[command(version)]
#[command(about = "Render image, palette and font resources to PNG", long_about = None)]
struct Cli {
	/// Input container file
	input: PathBuf,

	/// Resource type to render (e.g. PICT, cicn, icl8, clut, NFNT)
	#[arg(short = 't', long = "type")]
	type_tag: String,

	/// Render a single resource id instead of every one
	#[arg(long)]
	id: Option<i16>,

	/// Output directory
	#[arg(short, long, default_value = "render_out")]
	output: PathBuf,

	/// Sample text rendered alongside font strikes
	#[arg(long, default_value = "The quick brown fox jumps over the lazy dog.")]
	sample_text: String,
}

fn parse_type_tag(raw: &str) -> Result<TypeTag, String> {
	let bytes = raw.as_bytes();
	if bytes.is_empty() || bytes.len() > 4 {
		return Err(format!("type tag must be 1-4 bytes, got {raw:?}"));
	}
	let mut tag = [b' '; 4];
	tag[..bytes.len()].copy_from_slice(bytes);
	Ok(TypeTag::new(tag))
}

fn save_png(image: &Image, path: &PathBuf) -> Result<(), String> {
	let rgba = image.to_rgba8888();
	let buffer = image::RgbaImage::from_raw(
		rgba.width() as u32,
		rgba.height() as u32,
		rgba.pixels().to_vec(),
	)
	.ok_or_else(|| "cannot build image buffer".to_string())?;
	buffer.save(path).map_err(|e| format!("cannot save {}: {e}", path.display()))
}

/// Renders a palette as a 16-wide swatch grid, one 8x8 cell per entry.
fn palette_swatch(entries: &[palette::ColorTableEntry]) -> Image {
	let columns = 16usize;
	let rows = entries.len().div_ceil(columns);
	let mut image = Image::new(columns * 8, rows * 8, macrez_types::rsrc::image::PixelFormat::Rgba8888);
	for (index, entry) in entries.iter().enumerate() {
		let x = (index % columns) * 8;
		let y = (index / columns) * 8;
		image.fill_rect(x as i32, y as i32, 8, 8, entry.color.to_rgba32());
	}
	image
}

fn render_one(
	set: &mut ResourceSet,
	type_tag: TypeTag,
	id: i16,
	cli: &Cli,
) -> Result<Vec<PathBuf>, String> {
	let data = set
		.get(type_tag, id, 0)
		.map(|res| res.data.clone())
		.ok_or_else(|| format!("{type_tag} id {id} not found"))?;
	let base = cli.output.join(format!(
		"{}_{id}",
		container::directory::escape_filename(&type_tag.bytes())
	));
	let mut written = Vec::new();
	fn save_into(
		written: &mut Vec<PathBuf>,
		base: &std::path::Path,
		suffix: &str,
		image: &Image,
	) -> Result<(), String> {
		let path = PathBuf::from(format!("{}{suffix}.png", base.display()));
		save_png(image, &path)?;
		written.push(path);
		Ok(())
	}
	let mut save =
		|suffix: &str, image: &Image| save_into(&mut written, &base, suffix, image);

	match type_tag {
		t if t == tags::PICT => {
			let decoded = pict::decode_pict(&data).map_err(|e| e.to_string())?;
			if let Some(format) = decoded.embedded_format {
				let ext: String = format
					.to_display_string()
					.trim()
					.chars()
					.map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
					.collect();
				let path = PathBuf::from(format!("{}.{ext}", base.display()));
				std::fs::write(&path, &decoded.embedded_data)
					.map_err(|e| format!("cannot write {}: {e}", path.display()))?;
				written.push(path);
			} else {
				save("", &decoded.image)?;
			}
		}
		t if t == tags::CICN => {
			let decoded = icons::decode_cicn(&data).map_err(|e| e.to_string())?;
			save("", &decoded.image)?;
			save("_bitmap", &decoded.bitmap)?;
		}
		t if t == tags::CURS => {
			let decoded = icons::decode_curs(&data).map_err(|e| e.to_string())?;
			save("", &decoded.bitmap)?;
		}
		t if t == tags::CRSR => {
			let decoded = icons::decode_crsr(&data).map_err(|e| e.to_string())?;
			save("", &decoded.image)?;
			save("_bitmap", &decoded.bitmap)?;
		}
		t if t == tags::PPAT => {
			let decoded = icons::decode_ppat(&data).map_err(|e| e.to_string())?;
			save("", &decoded.pattern)?;
		}
		t if t == tags::PPTN => {
			for (index, decoded) in
				icons::decode_pptn(&data).map_err(|e| e.to_string())?.iter().enumerate()
			{
				save(&format!("_{index}"), &decoded.pattern)?;
			}
		}
		t if t == tags::PAT => {
			save("", &icons::decode_pat(&data).map_err(|e| e.to_string())?)?;
		}
		t if t == tags::PATN => {
			for (index, pat) in
				icons::decode_patn(&data).map_err(|e| e.to_string())?.iter().enumerate()
			{
				save(&format!("_{index}"), pat)?;
			}
		}
		t if t == tags::SICN => {
			for (index, icon) in
				icons::decode_sicn(&data).map_err(|e| e.to_string())?.iter().enumerate()
			{
				save(&format!("_{index}"), icon)?;
			}
		}
		t if t == tags::CLUT
			|| t == tags::ACTB
			|| t == tags::CCTB
			|| t == tags::DCTB
			|| t == tags::FCTB
			|| t == tags::WCTB =>
		{
			let entries = palette::decode_clut(&data).map_err(|e| e.to_string())?;
			save("", &palette_swatch(&entries))?;
		}
		t if t == tags::PLTT => {
			let colors = palette::decode_pltt(&data).map_err(|e| e.to_string())?;
			let entries: Vec<palette::ColorTableEntry> = colors
				.iter()
				.enumerate()
				.map(|(slot, &color)| palette::ColorTableEntry {
					slot: slot as u16,
					color,
				})
				.collect();
			save("", &palette_swatch(&entries))?;
		}
		t if t == tags::FONT || t == tags::NFNT => {
			let decoded = font::decode_font(&data).map_err(|e| e.to_string())?;
			save("_strike", &decoded.full_bitmap.to_rgba8888())?;
			let renderer = BitmapFontRenderer::new(&decoded);
			let sample = renderer
				.wrap_and_render(
					&cli.sample_text,
					256,
					0,
					0x0000_00FF,
					HorizontalAlignment::Left,
				)
				.map_err(|e| e.to_string())?;
			save("_sample", &sample)?;
		}
		// The whole fixed-geometry icon family goes through the set-aware
		// decoder so indexed variants can find their masks
		_ => {
			let image = icons::decode_icon_from_set(set, type_tag, id).map_err(|e| e.to_string())?;
			save("", &image)?;
		}
	}
	Ok(written)
}

fn main() -> ExitCode {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	let type_tag = match parse_type_tag(&cli.type_tag) {
		Ok(tag) => tag,
		Err(message) => {
			error!("{message}");
			return ExitCode::from(1);
		}
	};

	let data = match std::fs::read(&cli.input) {
		Ok(data) => data,
		Err(e) => {
			error!("cannot read {}: {e}", cli.input.display());
			return ExitCode::from(1);
		}
	};
	let mut set = match container::parse_auto(&data) {
		Ok(set) => set,
		Err(e) => {
			error!("cannot parse {}: {e}", cli.input.display());
			return ExitCode::from(1);
		}
	};

	let ids = match cli.id {
		Some(id) => vec![id],
		None => set.all_of_type(type_tag),
	};
	if ids.is_empty() {
		error!("no {type_tag} resources in {}", cli.input.display());
		return ExitCode::from(1);
	}
	if let Err(e) = std::fs::create_dir_all(&cli.output) {
		error!("cannot create {}: {e}", cli.output.display());
		return ExitCode::from(1);
	}

	let mut failures = 0usize;
	let mut rendered = 0usize;
	for id in ids {
		match render_one(&mut set, type_tag, id, &cli) {
			Ok(paths) => {
				rendered += paths.len();
				for path in paths {
					info!("wrote {}", path.display());
				}
			}
			Err(message) => {
				eprintln!("error: {type_tag} id {id}: {message}");
				failures += 1;
			}
		}
	}
	info!("{rendered} file(s) rendered, {failures} failure(s)");

	if failures > 0 {
		ExitCode::from(2)
	} else {
		ExitCode::SUCCESS
	}
}
