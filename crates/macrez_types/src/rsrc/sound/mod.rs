//! Sound and music resources.
//!
//! The `snd ` decoder walks the command list of a format 1 or format 2
//! sound, finds the buffer/sound command pointing at the sampled-sound
//! header, and decodes the standard (0x00), extended (0xFF) or compressed
//! (0xFE) header that follows. IMA4 compression is decompressed natively;
//! MACE-3/6 payloads are emitted unchanged with their compression tag.
//!
//! The SoundMusicSys-era variants layer three invertible transforms over
//! `snd ` and MIDI bodies: an LZSS scheme (`csnd`, `cmid`), a rolling XOR
//! stream cipher (`esnd`, `emid`, `ecmi`) and a running-sum delta (`ESnd`).

pub mod decoder;

use serde::Serialize;

use crate::rsrc::{
	ResourceSet, TypeTag,
	error::SoundError,
	reader::ByteReader,
	tags,
};

/// Sample encodings a [`DecodedSound`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleFormat {
	/// Unsigned 8-bit PCM
	U8,
	/// Signed 16-bit PCM (host order in memory)
	S16,
	/// MACE 3:1, left compressed
	Mace3,
	/// MACE 6:1, left compressed
	Mace6,
}

/// A decoded sampled sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSound {
	/// Source compression tag (`raw `, `ima4`, `MAC3`, `MAC6`)
	pub format_tag: TypeTag,
	/// Sampling rate as the original 16.16 fixed-point value
	pub sample_rate_fixed: u32,
	/// Channel count
	pub channels: u16,
	/// Sample encoding of `data`
	pub sample_format: SampleFormat,
	/// PCM bytes (or the untouched compressed payload for MACE)
	pub data: Vec<u8>,
	/// Loop start in sample frames
	pub loop_start: u32,
	/// Loop end in sample frames
	pub loop_end: u32,
	/// MIDI base note of the recording
	pub base_note: u8,
}

impl DecodedSound {
	/// Sampling rate in Hz.
	pub fn sample_rate_hz(&self) -> f64 {
		f64::from(self.sample_rate_fixed) / 65536.0
	}

	/// Writes the sound as a WAV file. Fails for MACE payloads, which stay
	/// compressed.
	pub fn write_wav<W: std::io::Write + std::io::Seek>(&self, writer: W) -> Result<(), SoundError> {
		let (bits, int_samples) = match self.sample_format {
			SampleFormat::U8 => (8, false),
			SampleFormat::S16 => (16, true),
			SampleFormat::Mace3 | SampleFormat::Mace6 => {
				return Err(SoundError::UnsupportedCompression {
					tag: self.format_tag,
				});
			}
		};
		let spec = hound::WavSpec {
			channels: self.channels.max(1),
			sample_rate: self.sample_rate_hz().round() as u32,
			bits_per_sample: bits,
			sample_format: hound::SampleFormat::Int,
		};
		let mut wav_writer = hound::WavWriter::new(writer, spec)?;
		if int_samples {
			for chunk in self.data.chunks_exact(2) {
				wav_writer.write_sample(i16::from_ne_bytes([chunk[0], chunk[1]]))?;
			}
		} else {
			for &byte in &self.data {
				wav_writer.write_sample((i16::from(byte) - 0x80) as i8)?;
			}
		}
		wav_writer.finalize()?;
		Ok(())
	}
}

mod encoding {
	pub const STANDARD: u8 = 0x00;
	pub const EXTENDED: u8 = 0xFF;
	pub const COMPRESSED: u8 = 0xFE;
}

const BUFFER_CMD: u16 = 0x0051;
const SOUND_CMD: u16 = 0x0050;
/// Command flag: the parameter is an offset into the resource.
const DATA_OFFSET_FLAG: u16 = 0x8000;

/// Decodes a `snd ` resource.
pub fn decode_snd(data: &[u8]) -> Result<DecodedSound, SoundError> {
	let mut r = ByteReader::new(data);
	let format = r.u16()?;
	match format {
		1 => {
			let synth_count = r.u16()?;
			// Each synth entry: resource id + init option
			r.skip(synth_count as usize * 6)?;
		}
		2 => {
			let _ref_count = r.u16()?;
		}
		other => {
			return Err(SoundError::UnsupportedFormat {
				format: other,
			});
		}
	}

	let command_count = r.u16()?;
	let mut header_offset = None;
	for _ in 0..command_count {
		let cmd = r.u16()?;
		let _param1 = r.u16()?;
		let param2 = r.u32()?;
		if matches!(cmd & !DATA_OFFSET_FLAG, BUFFER_CMD | SOUND_CMD) {
			header_offset = Some(param2 as usize);
		}
	}
	let Some(header_offset) = header_offset else {
		return Err(SoundError::MalformedResource {
			kind: "no buffer command",
			context: format!("{command_count} commands, none reference sample data"),
		});
	};

	decode_sampled_header(data, header_offset)
}

fn decode_sampled_header(data: &[u8], offset: usize) -> Result<DecodedSound, SoundError> {
	let mut r = ByteReader::new(data);
	r.seek(offset)?;

	let _data_ptr = r.u32()?;
	let length_or_channels = r.u32()?;
	let sample_rate_fixed = r.u32()?;
	let loop_start = r.u32()?;
	let loop_end = r.u32()?;
	let encoding_byte = r.u8()?;
	let base_note = r.u8()?;

	match encoding_byte {
		encoding::STANDARD => {
			// length_or_channels is the byte count of 8-bit mono samples
			let samples = r.read(length_or_channels as usize)?;
			Ok(DecodedSound {
				format_tag: TypeTag::new(*b"raw "),
				sample_rate_fixed,
				channels: 1,
				sample_format: SampleFormat::U8,
				data: samples.to_vec(),
				loop_start,
				loop_end,
				base_note,
			})
		}
		encoding::EXTENDED => {
			let channels = length_or_channels as u16;
			let num_frames = r.u32()?;
			r.skip(10)?; // 80-bit AIFF sample rate
			let _marker_chunk = r.u32()?;
			let _instrument_chunks = r.u32()?;
			let _aes_recording = r.u32()?;
			let sample_size = r.u16()?;
			r.skip(14)?; // future use
			let bytes_per_sample = usize::from(sample_size / 8).max(1);
			let total = num_frames as usize * channels.max(1) as usize * bytes_per_sample;
			let samples = r.read(total)?;
			Ok(DecodedSound {
				format_tag: TypeTag::new(*b"raw "),
				sample_rate_fixed,
				channels,
				sample_format: if sample_size > 8 {
					SampleFormat::S16
				} else {
					SampleFormat::U8
				},
				data: if sample_size > 8 {
					// stored big-endian; rewrite in host order
					samples
						.chunks_exact(2)
						.flat_map(|c| i16::from_be_bytes([c[0], c[1]]).to_ne_bytes())
						.collect()
				} else {
					samples.to_vec()
				},
				loop_start,
				loop_end,
				base_note,
			})
		}
		encoding::COMPRESSED => {
			let channels = length_or_channels as u16;
			let num_frames = r.u32()?;
			r.skip(10)?; // 80-bit AIFF sample rate
			let format_tag = TypeTag(r.u32()?);
			let _future_use = r.u32()?;
			let _state_vars = r.u32()?;
			let _leftover_samples = r.u32()?;
			let _compression_id = r.i16()?;
			let _packet_size = r.u16()?;
			let _snth_id = r.u16()?;
			let _sample_size = r.u16()?;

			if format_tag == TypeTag::new(*b"ima4") {
				let packet_bytes = num_frames as usize
					* decoder::IMA4_PACKET_SIZE
					* channels.max(1) as usize;
				let packets = r.read(packet_bytes)?;
				let pcm = decoder::decode_ima4(packets, channels)?;
				Ok(DecodedSound {
					format_tag,
					sample_rate_fixed,
					channels,
					sample_format: SampleFormat::S16,
					data: pcm.iter().flat_map(|s| s.to_ne_bytes()).collect(),
					loop_start,
					loop_end,
					base_note,
				})
			} else if format_tag == TypeTag::new(*b"MAC3") || format_tag == TypeTag::new(*b"MAC6")
			{
				Ok(DecodedSound {
					format_tag,
					sample_rate_fixed,
					channels,
					sample_format: if format_tag == TypeTag::new(*b"MAC3") {
						SampleFormat::Mace3
					} else {
						SampleFormat::Mace6
					},
					data: r.rest().to_vec(),
					loop_start,
					loop_end,
					base_note,
				})
			} else {
				Err(SoundError::UnsupportedCompression {
					tag: format_tag,
				})
			}
		}
		other => Err(SoundError::MalformedResource {
			kind: "unknown sample encoding",
			context: format!("encoding byte {other:#04X}"),
		}),
	}
}

/// Decodes an `SMSD` resource: headerless unsigned 8-bit samples at the
/// classic 11 kHz rate.
pub fn decode_smsd(data: &[u8]) -> DecodedSound {
	DecodedSound {
		format_tag: TypeTag::new(*b"raw "),
		sample_rate_fixed: 0x2B77_45D1, // 11127.27 Hz
		channels: 1,
		sample_format: SampleFormat::U8,
		data: data.to_vec(),
		loop_start: 0,
		loop_end: 0,
		base_note: 60,
	}
}

/// Initial key of the rolling stream cipher.
const CRYPT_SEED: u16 = 56549;

/// Inverts the rolling XOR stream cipher used by the encrypted sound and
/// MIDI variants. The keystream advances from each ciphertext byte, so the
/// transform is self-synchronizing and its own inverse direction is cheap.
pub fn decrypt_stream(data: &[u8]) -> Vec<u8> {
	let mut key = CRYPT_SEED;
	data.iter()
		.map(|&b| {
			let out = b ^ (key >> 8) as u8;
			key = u16::from(b).wrapping_add(key).wrapping_mul(52845).wrapping_add(22719);
			out
		})
		.collect()
}

/// The matching encryption direction (used by tests to build fixtures).
pub fn encrypt_stream(data: &[u8]) -> Vec<u8> {
	let mut key = CRYPT_SEED;
	data.iter()
		.map(|&b| {
			let enc = b ^ (key >> 8) as u8;
			key = u16::from(enc).wrapping_add(key).wrapping_mul(52845).wrapping_add(22719);
			enc
		})
		.collect()
}

/// Decompresses the LZSS scheme used by `csnd`/`cmid`: a 4096-byte ring
/// window, control bytes holding eight LSB-first flags, references stored as
/// `offset low byte, offset high nibble | length - 3`.
pub fn decompress_lzss(data: &[u8], expected_len: usize) -> Result<Vec<u8>, SoundError> {
	let mut out = Vec::with_capacity(expected_len);
	let mut window = [0u8; 0x1000];
	let mut window_pos = 0x0FEE;
	let mut r = ByteReader::new(data);

	'outer: while out.len() < expected_len {
		let control = r.u8()?;
		for bit in 0..8 {
			if out.len() >= expected_len {
				break 'outer;
			}
			if (control >> bit) & 1 != 0 {
				let byte = r.u8()?;
				out.push(byte);
				window[window_pos] = byte;
				window_pos = (window_pos + 1) & 0x0FFF;
			} else {
				let b1 = r.u8()?;
				let b2 = r.u8()?;
				let offset = usize::from(b1) | (usize::from(b2 & 0xF0) << 4);
				let length = usize::from(b2 & 0x0F) + 3;
				for i in 0..length {
					if out.len() >= expected_len {
						break;
					}
					let byte = window[(offset + i) & 0x0FFF];
					out.push(byte);
					window[window_pos] = byte;
					window_pos = (window_pos + 1) & 0x0FFF;
				}
			}
		}
	}
	Ok(out)
}

/// Decodes a `csnd` resource: a 32-bit decompressed size, LZSS data, then an
/// ordinary `snd `.
pub fn decode_csnd(data: &[u8]) -> Result<DecodedSound, SoundError> {
	let mut r = ByteReader::new(data);
	let decompressed_size = r.u32()? as usize;
	let snd = decompress_lzss(r.rest(), decompressed_size)?;
	decode_snd(&snd)
}

/// Decodes an `esnd` resource: stream-encrypted `snd `.
pub fn decode_esnd(data: &[u8]) -> Result<DecodedSound, SoundError> {
	decode_snd(&decrypt_stream(data))
}

/// Decodes an `ESnd` resource: a running-sum delta over an ordinary `snd `.
pub fn decode_esnd_delta(data: &[u8]) -> Result<DecodedSound, SoundError> {
	let mut acc = 0u8;
	let decoded: Vec<u8> = data
		.iter()
		.map(|&b| {
			acc = acc.wrapping_add(b);
			acc
		})
		.collect();
	decode_snd(&decoded)
}

/// A MIDI stream recovered from a music resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMidi {
	/// Source resource type
	pub source_type: TypeTag,
	/// Raw MIDI bytes
	pub data: Vec<u8>,
}

/// Standard MIDI file magic.
const MIDI_MAGIC: &[u8; 4] = b"MThd";

fn check_midi(source_type: TypeTag, data: Vec<u8>) -> Result<DecodedMidi, SoundError> {
	if data.len() < 4 || &data[..4] != MIDI_MAGIC {
		return Err(SoundError::MalformedResource {
			kind: "not a MIDI stream",
			context: format!("{source_type} payload does not start with MThd"),
		});
	}
	Ok(DecodedMidi {
		source_type,
		data,
	})
}

/// Decodes a `cmid` resource: LZSS-compressed MIDI.
pub fn decode_cmid(data: &[u8]) -> Result<DecodedMidi, SoundError> {
	let mut r = ByteReader::new(data);
	let decompressed_size = r.u32()? as usize;
	check_midi(tags::CMID, decompress_lzss(r.rest(), decompressed_size)?)
}

/// Decodes an `emid` resource: stream-encrypted MIDI.
pub fn decode_emid(data: &[u8]) -> Result<DecodedMidi, SoundError> {
	check_midi(tags::EMID, decrypt_stream(data))
}

/// Decodes an `ecmi` resource: stream-encrypted, then LZSS-compressed MIDI.
pub fn decode_ecmi(data: &[u8]) -> Result<DecodedMidi, SoundError> {
	let decrypted = decrypt_stream(data);
	let mut r = ByteReader::new(&decrypted);
	let decompressed_size = r.u32()? as usize;
	check_midi(tags::ECMI, decompress_lzss(r.rest(), decompressed_size)?)
}

/// Decodes a `Tune` resource envelope: the QuickTime music stream is handed
/// through unchanged for a downstream player.
pub fn decode_tune(data: &[u8]) -> Result<DecodedMidi, SoundError> {
	if data.is_empty() {
		return Err(SoundError::MalformedResource {
			kind: "empty Tune resource",
			context: String::new(),
		});
	}
	Ok(DecodedMidi {
		source_type: tags::TUNE,
		data: data.to_vec(),
	})
}

/// One key region of an `INST` instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyRegion {
	/// Lowest MIDI key this region covers
	pub key_low: u8,
	/// Highest MIDI key this region covers
	pub key_high: u8,
	/// Base note for playback
	pub base_note: u8,
	/// Referenced sound resource id
	pub snd_id: i16,
	/// Resolved sound resource type (`snd `, `csnd` or `esnd`)
	pub snd_type: TypeTag,
}

/// A decoded `INST` instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedInstrument {
	/// Key regions in stored order; a single-region instrument covers the
	/// whole keyboard
	pub key_regions: Vec<KeyRegion>,
	/// Instrument-wide base note (zero = use the sample's own)
	pub base_note: u8,
	/// Play at the recorded sample rate instead of retuning
	pub use_sample_rate: bool,
	/// Ignore the note number entirely
	pub constant_pitch: bool,
}

/// Sound resource families an `INST` may reference, in lookup order.
const INST_SND_TYPES: [TypeTag; 3] = [tags::SND, tags::CSND, tags::ESND_LOWER];

/// Decodes an `INST` resource, resolving each referenced sound against the
/// set it came from.
pub fn decode_inst(
	set: &ResourceSet,
	consumer_id: i16,
	data: &[u8],
) -> Result<DecodedInstrument, SoundError> {
	let mut r = ByteReader::new(data);
	let base_snd_id = r.i16()?;
	let base_note = r.u8()?;
	let _panning = r.u8()?;
	let flags1 = r.u8()?;
	let flags2 = r.u8()?;
	let _smod_id = r.u8()?;
	let _smod_params = r.u16()?;
	let key_region_count = r.u16()? as usize;

	let resolve = |snd_id: i16| -> Result<TypeTag, SoundError> {
		set.find_by_id(snd_id, &INST_SND_TYPES).ok_or_else(|| SoundError::MalformedResource {
			kind: "missing sound dependency",
			context: format!("INST {consumer_id} references sound id {snd_id}"),
		})
	};

	let mut key_regions = Vec::new();
	if key_region_count == 0 {
		key_regions.push(KeyRegion {
			key_low: 0,
			key_high: 0x7F,
			base_note,
			snd_id: base_snd_id,
			snd_type: resolve(base_snd_id)?,
		});
	}
	for _ in 0..key_region_count {
		let key_low = r.u8()?;
		let key_high = r.u8()?;
		let snd_id = r.i16()?;
		let _smod_params = r.u32()?;
		key_regions.push(KeyRegion {
			key_low,
			key_high,
			base_note,
			snd_id,
			snd_type: resolve(snd_id)?,
		});
	}

	Ok(DecodedInstrument {
		key_regions,
		base_note,
		use_sample_rate: flags1 & 0x40 != 0,
		constant_pitch: flags2 & 0x80 != 0,
	})
}

/// A decoded `SONG` resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSong {
	/// Referenced MIDI resource id
	pub midi_id: i16,
	/// Tempo bias (16667 = normal speed)
	pub tempo_bias: u16,
	/// Global transposition in semitones
	pub semitone_shift: i8,
	/// Instrument used for percussion
	pub percussion_instrument: u8,
	/// Whether MIDI program changes are honored
	pub allow_program_change: bool,
	/// Instrument substitutions: `(from, to)` pairs
	pub instrument_overrides: Vec<(u16, u16)>,
}

/// Decodes a `SONG` resource.
pub fn decode_song(data: &[u8]) -> Result<DecodedSong, SoundError> {
	let mut r = ByteReader::new(data);
	let midi_id = r.i16()?;
	let _lead_inst_id = r.u16()?;
	let tempo_bias = r.u16()?;
	let semitone_shift = r.i8()?;
	let percussion_instrument = r.u8()?;
	let flags1 = r.u8()?;
	let _flags2 = r.u8()?;
	let override_count = r.u16()? as usize;

	let mut instrument_overrides = Vec::with_capacity(override_count);
	for _ in 0..override_count {
		let from = r.u16()?;
		let to = r.u16()?;
		instrument_overrides.push((from, to));
	}
	Ok(DecodedSong {
		midi_id,
		tempo_bias,
		semitone_shift,
		percussion_instrument,
		allow_program_change: flags1 & 0x02 != 0,
		instrument_overrides,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rsrc::Resource;

	/// Builds a format 1 `snd ` with one standard sampled-sound header.
	fn build_snd(samples: &[u8]) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&1u16.to_be_bytes()); // format 1
		out.extend_from_slice(&1u16.to_be_bytes()); // one synth
		out.extend_from_slice(&5u16.to_be_bytes()); // sampledSynth
		out.extend_from_slice(&0u32.to_be_bytes()); // init options
		out.extend_from_slice(&1u16.to_be_bytes()); // one command
		out.extend_from_slice(&(BUFFER_CMD | DATA_OFFSET_FLAG).to_be_bytes());
		out.extend_from_slice(&0u16.to_be_bytes());
		let header_offset_pos = out.len();
		out.extend_from_slice(&0u32.to_be_bytes());
		let header_offset = out.len() as u32;
		out[header_offset_pos..header_offset_pos + 4]
			.copy_from_slice(&header_offset.to_be_bytes());
		// standard sampled sound header
		out.extend_from_slice(&0u32.to_be_bytes()); // data ptr
		out.extend_from_slice(&(samples.len() as u32).to_be_bytes());
		out.extend_from_slice(&0x5622_0000u32.to_be_bytes()); // 22050 Hz
		out.extend_from_slice(&0u32.to_be_bytes()); // loop start
		out.extend_from_slice(&(samples.len() as u32).to_be_bytes()); // loop end
		out.push(encoding::STANDARD);
		out.push(60); // base note
		out.extend_from_slice(samples);
		out
	}

	#[test]
	fn test_decode_snd_standard_header() {
		let snd = build_snd(&[0x80, 0x90, 0x70, 0x80]);
		let decoded = decode_snd(&snd).unwrap();
		assert_eq!(decoded.sample_format, SampleFormat::U8);
		assert_eq!(decoded.channels, 1);
		assert_eq!(decoded.data, vec![0x80, 0x90, 0x70, 0x80]);
		assert!((decoded.sample_rate_hz() - 22050.0).abs() < 0.01);
		assert_eq!(decoded.base_note, 60);
	}

	#[test]
	fn test_decode_snd_bad_format() {
		let mut snd = build_snd(&[0x80]);
		snd[1] = 9;
		assert!(matches!(
			decode_snd(&snd),
			Err(SoundError::UnsupportedFormat { format: 9 })
		));
	}

	#[test]
	fn test_decode_snd_no_commands() {
		let mut out = Vec::new();
		out.extend_from_slice(&2u16.to_be_bytes());
		out.extend_from_slice(&0u16.to_be_bytes());
		out.extend_from_slice(&0u16.to_be_bytes());
		assert!(matches!(
			decode_snd(&out),
			Err(SoundError::MalformedResource { .. })
		));
	}

	#[test]
	fn test_wav_output_shape() {
		let snd = build_snd(&[0x80; 32]);
		let decoded = decode_snd(&snd).unwrap();
		let mut cursor = std::io::Cursor::new(Vec::new());
		decoded.write_wav(&mut cursor).unwrap();
		let bytes = cursor.into_inner();
		assert_eq!(&bytes[..4], b"RIFF");
		assert_eq!(&bytes[8..12], b"WAVE");
	}

	#[test]
	fn test_crypt_roundtrip() {
		let plain = b"SoundMusicSys sample data \x00\x01\x02";
		let encrypted = encrypt_stream(plain);
		assert_ne!(&encrypted, plain);
		assert_eq!(decrypt_stream(&encrypted), plain);
	}

	#[test]
	fn test_lzss_literals() {
		// control 0xFF = eight literals
		let mut data = vec![0xFF];
		data.extend_from_slice(b"abcdefgh");
		assert_eq!(decompress_lzss(&data, 8).unwrap(), b"abcdefgh");
	}

	#[test]
	fn test_lzss_back_reference() {
		// 4 literals, then a reference to the window where they landed
		// (window fill starts at 0xFEE)
		let mut data = vec![0x0F]; // low 4 bits literal, then a reference
		data.extend_from_slice(b"abcd");
		data.push(0xEE); // offset low byte
		data.push(0xF0 | 0x01); // offset high nibble 0xF, length 4
		let out = decompress_lzss(&data, 8).unwrap();
		assert_eq!(out, b"abcdabcd");
	}

	#[test]
	fn test_decode_esnd_roundtrip() {
		let snd = build_snd(&[0x80, 0x81, 0x82, 0x83]);
		let decoded = decode_esnd(&encrypt_stream(&snd)).unwrap();
		assert_eq!(decoded.data, vec![0x80, 0x81, 0x82, 0x83]);
	}

	#[test]
	fn test_decode_esnd_delta() {
		let snd = build_snd(&[1, 2, 3]);
		// forward delta: first byte kept, then differences
		let mut delta = Vec::with_capacity(snd.len());
		let mut prev = 0u8;
		for &b in &snd {
			delta.push(b.wrapping_sub(prev));
			prev = b;
		}
		let decoded = decode_esnd_delta(&delta).unwrap();
		assert_eq!(decoded.data, vec![1, 2, 3]);
	}

	#[test]
	fn test_decode_csnd() {
		let snd = build_snd(&[0x10, 0x20]);
		let mut body = (snd.len() as u32).to_be_bytes().to_vec();
		// literal-only LZSS stream
		for chunk in snd.chunks(8) {
			body.push(0xFF);
			body.extend_from_slice(chunk);
		}
		let decoded = decode_csnd(&body).unwrap();
		assert_eq!(decoded.data, vec![0x10, 0x20]);
	}

	#[test]
	fn test_decode_emid_checks_magic() {
		let midi = b"MThd\x00\x00\x00\x06data".to_vec();
		let decoded = decode_emid(&encrypt_stream(&midi)).unwrap();
		assert_eq!(decoded.data, midi);
		assert!(decode_emid(&encrypt_stream(b"nope")).is_err());
	}

	#[test]
	fn test_decode_inst_resolves_sound_type() {
		let mut set = ResourceSet::new();
		set.add(Resource::new(tags::CSND, 500, vec![]));

		let mut data = Vec::new();
		data.extend_from_slice(&500i16.to_be_bytes());
		data.push(60); // base note
		data.push(0); // panning
		data.push(0x40); // flags1: use sample rate
		data.push(0x00); // flags2
		data.push(0); // smod id
		data.extend_from_slice(&0u16.to_be_bytes());
		data.extend_from_slice(&0u16.to_be_bytes()); // no key regions

		let decoded = decode_inst(&set, 1, &data).unwrap();
		assert_eq!(decoded.key_regions.len(), 1);
		assert_eq!(decoded.key_regions[0].snd_type, tags::CSND);
		assert_eq!(decoded.key_regions[0].key_high, 0x7F);
		assert!(decoded.use_sample_rate);
		assert!(!decoded.constant_pitch);
	}

	#[test]
	fn test_decode_inst_missing_sound() {
		let set = ResourceSet::new();
		let mut data = Vec::new();
		data.extend_from_slice(&500i16.to_be_bytes());
		data.extend_from_slice(&[60, 0, 0, 0, 0]);
		data.extend_from_slice(&0u16.to_be_bytes());
		data.extend_from_slice(&0u16.to_be_bytes());
		assert!(decode_inst(&set, 1, &data).is_err());
	}

	#[test]
	fn test_decode_song() {
		let mut data = Vec::new();
		data.extend_from_slice(&1000i16.to_be_bytes());
		data.extend_from_slice(&0u16.to_be_bytes());
		data.extend_from_slice(&16667u16.to_be_bytes());
		data.push(2u8); // +2 semitones
		data.push(0x7F);
		data.push(0x02); // allow program change
		data.push(0);
		data.extend_from_slice(&1u16.to_be_bytes());
		data.extend_from_slice(&1u16.to_be_bytes());
		data.extend_from_slice(&22u16.to_be_bytes());
		let decoded = decode_song(&data).unwrap();
		assert_eq!(decoded.midi_id, 1000);
		assert_eq!(decoded.tempo_bias, 16667);
		assert_eq!(decoded.semitone_shift, 2);
		assert!(decoded.allow_program_change);
		assert_eq!(decoded.instrument_overrides, vec![(1, 22)]);
	}
}
