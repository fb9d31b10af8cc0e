use std::path::Path;

use eyre::eyre;
use lbx::{classify, embedded_palette, Archive, AssetKind};

const COLORS_PER_LINE: usize = 8;

/// Colors as `#rrggbb`, each line prefixed by the index of its first entry.
pub fn format_palette(start: u16, colors: &[[u8; 3]]) -> String {
    colors
        .chunks(COLORS_PER_LINE)
        .enumerate()
        .map(|(line, chunk)| {
            let first = start as usize + line * COLORS_PER_LINE;
            let colors = chunk
                .iter()
                .map(|[r, g, b]| format!("#{r:02x}{g:02x}{b:02x}"))
                .collect::<Vec<String>>()
                .join(" ");

            format!("{first:3}: {colors}\n")
        })
        .collect()
}

pub fn dump_palettes(path: &Path, indices: &[usize]) -> eyre::Result<String> {
    let mut archive =
        Archive::open_from_file(path).map_err(|err| eyre!("{}: {}", path.display(), err))?;
    let mut res = String::new();

    for &index in indices {
        res += format!("Asset {index}:\n").as_str();

        let data = archive.load_asset(index)?;

        if !matches!(classify(&data), AssetKind::Image(_) | AssetKind::Cursor) {
            res += "Asset is not an image\n";
            continue;
        }

        match embedded_palette(&data)? {
            Some((start, colors)) => res += format_palette(start, &colors).as_str(),
            None => res += "No palette\n",
        }
    }

    Ok(res)
}
