use folio::catalog::{parse_keywords, AccountDirectory, BookCatalog, BookKeys, Isbn, UserId};
use folio::{tools, FixedStr};

mod common;

use common::Scratch;

#[test]
fn accounts_survive_restart() {
    let scratch = Scratch::new();
    let dir = scratch.path("store");
    {
        let mut accounts = AccountDirectory::open(&dir).unwrap();
        for (i, name) in ["root", "clerk", "guest"].iter().enumerate() {
            let id = UserId::new(name).unwrap();
            assert!(accounts.register(id, i as u32 * 128).unwrap());
        }
        accounts.flush().unwrap();
    }
    let accounts = AccountDirectory::open(&dir).unwrap();
    let names = accounts
        .all()
        .unwrap()
        .into_iter()
        .map(|(id, _)| id.to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["clerk", "guest", "root"]);
    let stats = tools::validate_index::<UserId, u32>(dir.join("accounts.idx")).unwrap();
    assert_eq!(stats.entries, 3);
}

#[test]
fn catalog_search_after_edits() {
    let scratch = Scratch::new();
    let dir = scratch.path("store");
    let mut catalog = BookCatalog::open(&dir).unwrap();
    let field = |text: &str| FixedStr::<60>::new(text).unwrap();

    for i in 0..30u32 {
        let mut book = BookKeys::new(Isbn::new(&format!("isbn-{:02}", i)).unwrap());
        catalog.select_or_create(&book.isbn, i * 100).unwrap();
        let author = if i % 3 == 0 { "Le Guin" } else { "Tolkien" };
        catalog.set_author(&book, field(author)).unwrap();
        book.author = field(author);
        let keywords = parse_keywords(if i % 2 == 0 { "fantasy|even" } else { "fantasy" }).unwrap();
        catalog.set_keywords(&book, &keywords).unwrap();
    }
    assert_eq!(catalog.by_author(&field("Le Guin")).unwrap().len(), 10);
    assert_eq!(catalog.by_author(&field("Tolkien")).unwrap().len(), 20);
    assert_eq!(catalog.by_keyword(&field("fantasy")).unwrap().len(), 30);
    assert_eq!(
        catalog.by_keyword(&field("even")).unwrap(),
        (0..30).step_by(2).map(|i| i * 100).collect::<Vec<u32>>()
    );
    assert!(catalog.by_name(&field("Earthsea")).unwrap().is_empty());
    assert_eq!(catalog.all().unwrap().len(), 30);
    catalog.flush().unwrap();
}
