mod common;

use std::io::Write;
use std::sync::Arc;

use common::{EpubFixture, chapter, moby_dick};
use runepub::{
    DEFAULT_MAX_UPLOAD, FontFamily, ImportError, JsonFileStore, LocalFileReader, MemoryReader,
    Preferences, ReaderState, import_book,
};

async fn import(data: Vec<u8>) -> Result<runepub::Book, ImportError> {
    import_book("book.epub", Arc::new(MemoryReader::new(data)), DEFAULT_MAX_UPLOAD).await
}

#[tokio::test]
async fn chapters_follow_spine_order() {
    let book = import(moby_dick().build()).await.unwrap();

    let titles: Vec<_> = book.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Loomings", "The Carpet-Bag", "The Spouter-Inn"]);

    let paths: Vec<_> = book.chapters.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(
        paths,
        ["OEBPS/text/ch1.xhtml", "OEBPS/text/ch2.xhtml", "OEBPS/text/ch3.xhtml"]
    );

    assert_eq!(book.title(), "Moby Dick");
    assert_eq!(book.metadata.creator.as_deref(), Some("Herman Melville"));
    assert!(book.chapters[0].content.contains("Call me Ishmael."));
}

#[tokio::test]
async fn missing_chapter_is_skipped() {
    let opf = r#"<package>
  <manifest>
    <item id="a" href="a.xhtml"/>
    <item id="gone" href="gone.xhtml"/>
    <item id="b" href="b.xhtml"/>
  </manifest>
  <spine><itemref idref="a"/><itemref idref="gone"/><itemref idref="nowhere"/><itemref idref="b"/></spine>
</package>"#;
    let data = EpubFixture::new()
        .opf("OEBPS/content.opf", opf)
        .file("OEBPS/a.xhtml", &chapter("First", "", "one"))
        .file("OEBPS/b.xhtml", "<html><body><h2>Second</h2></body></html>")
        .build();

    let book = import(data).await.unwrap();
    let titles: Vec<_> = book.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);
}

#[tokio::test]
async fn untitled_chapters_are_numbered_by_position() {
    let container = r#"<container><rootfiles><rootfile full-path="book.opf"/></rootfiles></container>"#;
    let opf = r#"<package>
  <manifest><item id="a" href="a.html"/><item id="b" href="b.html"/></manifest>
  <spine><itemref idref="a"/><itemref idref="b"/></spine>
</package>"#;
    let data = EpubFixture::new()
        .container(container)
        .opf("book.opf", opf)
        .file("a.html", "<html><body><p>no title</p></body></html>")
        .file("b.html", "<html><body><p>none here either</p></body></html>")
        .build();

    let book = import(data).await.unwrap();
    let titles: Vec<_> = book.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Chapter 1", "Chapter 2"]);
    assert_eq!(book.title(), "Chapter 1");
}

#[tokio::test]
async fn untitled_chapter_after_skipped_one_is_numbered_by_loaded_position() {
    let opf = r#"<package>
  <manifest><item id="gone" href="gone.xhtml"/><item id="plain" href="plain.xhtml"/></manifest>
  <spine><itemref idref="gone"/><itemref idref="plain"/></spine>
</package>"#;
    let data = EpubFixture::new()
        .opf("OEBPS/content.opf", opf)
        .file("OEBPS/plain.xhtml", "<html><body><p>untitled</p></body></html>")
        .build();

    let book = import(data).await.unwrap();
    assert_eq!(book.chapters.len(), 1);
    assert_eq!(book.chapters[0].title, "Chapter 1");
    assert_eq!(book.chapters[0].path, "OEBPS/plain.xhtml");
}

#[tokio::test]
async fn non_epub_name_is_rejected() {
    let err = import_book(
        "holiday.pdf",
        Arc::new(MemoryReader::new(moby_dick().build())),
        DEFAULT_MAX_UPLOAD,
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Please select a valid EPUB file.");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let data = moby_dick().build();
    let limit = data.len() as u64 - 1;
    let err = import_book("book.epub", Arc::new(MemoryReader::new(data)), limit)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::FileTooLarge { .. }));
}

#[tokio::test]
async fn archive_without_container_is_malformed() {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("mimetype", zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(b"application/epub+zip").unwrap();
    let data = writer.finish().unwrap().into_inner();

    let err = import(data).await.unwrap_err();
    assert!(matches!(err, ImportError::Malformed(ref details) if details.contains("container")));
    assert_eq!(
        err.to_string(),
        "Error loading EPUB file. Please ensure it's a valid EPUB format."
    );
}

#[tokio::test]
async fn import_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".epub").tempfile().unwrap();
    file.write_all(&moby_dick().build()).unwrap();

    let local = LocalFileReader::new(file.path()).unwrap();
    let book = import_book("moby.epub", Arc::new(local), DEFAULT_MAX_UPLOAD)
        .await
        .unwrap();
    assert_eq!(book.chapters.len(), 3);

    let buffered = MemoryReader::from_file(file.path()).await.unwrap();
    let again = import_book("moby.epub", Arc::new(buffered), DEFAULT_MAX_UPLOAD)
        .await
        .unwrap();
    assert_eq!(again.chapters, book.chapters);
}

#[tokio::test]
async fn reading_session_navigates_and_keeps_font() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("settings.json");

    let mut state = ReaderState::new();
    state.load(import(moby_dick().build()).await.unwrap());
    assert_eq!(state.page_info(), "Chapter 1 of 3");

    assert!(state.next());
    assert!(state.next());
    assert!(!state.next());
    assert_eq!(state.current().unwrap().title, "The Spouter-Inn");

    let mut prefs = Preferences::load(JsonFileStore::new(&store_path));
    prefs.set_font_family(FontFamily::Poppins).unwrap();

    // Next session.
    let prefs = Preferences::load(JsonFileStore::new(&store_path));
    assert_eq!(prefs.settings().font_family, FontFamily::Poppins);
    assert_eq!(prefs.settings().font_size, 16);
}
