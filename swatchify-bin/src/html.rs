//! Renders the palette as a standalone HTML page of color tiles

use std::{fmt::Write as _, fs, io, path::Path};
use swatchify::Swatch;

/// Page markup before the tiles
const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <title>Palette</title>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>body{margin:0;padding:0;width:100vw;display:flex;flex-wrap:wrap;}div{width:25vw;height:25vw;}</style>
  </head>
  <body>
"#;

/// Page markup after the tiles
const TAIL: &str = "  </body>
</html>
";

/// Render one tile per swatch, in the given order
pub fn render(swatches: &[Swatch]) -> String {
    let mut page = String::from(HEAD);
    for swatch in swatches {
        // Writing to a String cannot fail
        let _ = writeln!(
            page,
            r#"    <div class="swatch" style="background-color: {swatch};"></div>"#
        );
    }
    page.push_str(TAIL);
    page
}

/// Render and write the page to `path`, replacing any existing file
pub fn write(path: &Path, swatches: &[Swatch]) -> io::Result<()> {
    fs::write(path, render(swatches))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn one_tile_per_swatch_in_order() {
        let page = render(&[Swatch::new(0, 100, 50), Swatch::new(240, 20, 75)]);

        let red = page.find("hsl(0, 100%, 50%)").unwrap();
        let blue = page.find("hsl(240, 20%, 75%)").unwrap();
        assert!(red < blue);
        assert_eq!(page.matches(r#"class="swatch""#).count(), 2);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn empty_palette_is_still_a_page() {
        let page = render(&[]);
        assert!(!page.contains("swatch"));
        assert!(page.contains("<body>"));
    }

    #[test]
    fn write_creates_file() {
        let path = std::env::temp_dir().join(format!("swatchify-html-{}.html", std::process::id()));
        write(&path, &[Swatch::new(120, 50, 50)]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(contents, render(&[Swatch::new(120, 50, 50)]));
    }
}
