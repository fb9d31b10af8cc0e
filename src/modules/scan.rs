use std::path::Path;

use eyre::eyre;
use lbx::{
    classify,
    constants::{
        CURSOR_HEIGHT, CURSOR_WIDTH, FLAG_FILLBG, FLAG_JUNCTION, FLAG_KEYCOLOR, FLAG_NOCOMPRESS,
        FLAG_PALETTE,
    },
    Archive, AssetKind, ImageHeader, LbxError,
};

const FLAG_NAMES: &[(u16, &str)] = &[
    (FLAG_NOCOMPRESS, "nocompress"),
    (FLAG_FILLBG, "fillbg"),
    (FLAG_KEYCOLOR, "keycolor"),
    (FLAG_PALETTE, "palette"),
    (FLAG_JUNCTION, "junction"),
];

fn flag_names(header: &ImageHeader) -> String {
    let names = FLAG_NAMES
        .iter()
        .filter(|(flag, _)| header.flags & flag != 0)
        .map(|(_, name)| *name)
        .collect::<Vec<&str>>();

    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(" ")
    }
}

fn describe(kind: &AssetKind) -> String {
    match kind {
        AssetKind::Image(layout) => {
            let header = &layout.header;
            let mut res = format!(
                "image {}x{}, {} frames @{}ms",
                header.width, header.height, header.frame_count, header.frame_time
            );

            if let Some(segment) = &layout.palette_segment {
                let range = segment.range();

                // empty segments still report where they would start
                res += format!(
                    ", palette {}-{}",
                    range.start,
                    range.end.max(range.start + 1) - 1
                )
                .as_str();
            }

            res + format!(", flags {}", flag_names(header)).as_str()
        }
        AssetKind::Cursor => format!("cursor {CURSOR_WIDTH}x{CURSOR_HEIGHT}"),
        AssetKind::Text(text) => format!("text \"{}\"", String::from_utf8_lossy(text)),
        kind => kind.name().to_string(),
    }
}

/// Returns the report of every asset in the archive.
pub fn scan_archive(path: &Path) -> eyre::Result<String> {
    let mut archive = match Archive::open_from_file(path) {
        Ok(archive) => archive,
        Err(LbxError::SmackerVideo) => {
            return Ok(format!("{}: Smacker video, not an archive\n", path.display()))
        }
        Err(err) => return Err(eyre!("{}: {}", path.display(), err)),
    };

    let mut res = String::new();

    res += format!("{}: {} assets\n", path.display(), archive.asset_count()).as_str();

    if let Some(position) = archive.header_padding()? {
        res += format!("Extra data in header at position {position}\n").as_str();
    }

    let entries = archive.entries().to_vec();

    for (index, entry) in entries.into_iter().enumerate() {
        res += format!(
            "Asset {index}: offset {}, size {} bytes, ",
            entry.offset, entry.length
        )
        .as_str();

        match archive.load_asset(index) {
            Ok(data) => res += describe(&classify(&data)).as_str(),
            Err(err) => res += format!("unreadable ({err})").as_str(),
        }

        res += "\n";
    }

    Ok(res)
}
