//! `META-INF/container.xml` parsing.

use anyhow::{Result, bail};
use quick_xml::events::Event;

use super::xml::{attr, lenient_reader, local_name};

/// Archive path of the OCF container descriptor.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Return the `full-path` of the first `rootfile`, i.e. the OPF location.
pub fn parse_container(content: &[u8]) -> Result<String> {
    let mut reader = lenient_reader(content);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == "rootfile" {
                    match attr(&reader, &e, "full-path") {
                        Some(path) if !path.trim().is_empty() => {
                            return Ok(path.trim().to_string());
                        }
                        _ => bail!("rootfile has no full-path"),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => bail!("Malformed container.xml: {}", e),
        }
        buf.clear();
    }

    bail!("container.xml has no rootfile")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    <rootfile full-path="alt/other.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    #[test]
    fn test_first_rootfile_wins() {
        assert_eq!(parse_container(CONTAINER.as_bytes()).unwrap(), "OEBPS/content.opf");
    }

    #[test]
    fn test_missing_rootfile() {
        let xml = r#"<container><rootfiles></rootfiles></container>"#;
        let err = parse_container(xml.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no rootfile"));
    }

    #[test]
    fn test_rootfile_without_path() {
        let xml = r#"<container><rootfiles><rootfile media-type="x"/></rootfiles></container>"#;
        assert!(parse_container(xml.as_bytes()).is_err());
    }
}
