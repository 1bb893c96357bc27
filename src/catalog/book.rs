use super::prelude::*;

const ISBN_FILE: &str = "isbn.idx";
const NAME_FILE: &str = "name.idx";
const AUTHOR_FILE: &str = "author.idx";
const KEYWORD_FILE: &str = "keyword.idx";

const KEYWORD_SEPARATOR: char = '|';

/// Indexed fields of one book as currently stored in its record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookKeys {
    /// Primary key.
    pub isbn: Isbn,
    /// Title, empty if unset.
    pub name: BookName,
    /// Author, empty if unset.
    pub author: Author,
    /// Keywords, empty if unset.
    pub keywords: Vec<Keyword>,
}

impl BookKeys {
    /// A book that only has its ISBN set, as created on first selection.
    pub fn new(isbn: Isbn) -> Self {
        Self {
            isbn,
            ..Self::default()
        }
    }
}

/// Locates book records by ISBN, and by name, author or keyword.
///
/// The secondary indexes map `(field, ISBN)` to the record offset, so a group
/// scan over a field value yields offsets in ISBN order. Empty fields are not
/// indexed.
#[derive(Debug)]
pub struct BookCatalog {
    isbn: OrderedIndex<Isbn, RecordOffset>,
    name: CompositeIndex<BookName, Isbn, RecordOffset>,
    author: CompositeIndex<Author, Isbn, RecordOffset>,
    keyword: CompositeIndex<Keyword, Isbn, RecordOffset>,
}

impl BookCatalog {
    /// Opens the four index files in `dir`, creating them if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            isbn: open_in(dir, ISBN_FILE)?,
            name: open_composite_in(dir, NAME_FILE)?,
            author: open_composite_in(dir, AUTHOR_FILE)?,
            keyword: open_composite_in(dir, KEYWORD_FILE)?,
        })
    }

    /// Offset of the book with `isbn`; registers `offset` for it if there is none.
    pub fn select_or_create(&mut self, isbn: &Isbn, offset: RecordOffset) -> Result<RecordOffset> {
        if let Some(existing) = self.isbn.get(isbn)? {
            return Ok(existing);
        }
        self.isbn.insert(*isbn, offset)?;
        debug!("book {} registered at {}", isbn, offset);
        Ok(offset)
    }

    /// Offset of the book with `isbn`.
    pub fn find(&self, isbn: &Isbn) -> Result<Option<RecordOffset>> {
        self.isbn.get(isbn)
    }

    /// Offsets of books titled `name`, in ISBN order.
    pub fn by_name(&self, name: &BookName) -> Result<Vec<RecordOffset>> {
        self.name.traverse_group(name)
    }

    /// Offsets of books by `author`, in ISBN order.
    pub fn by_author(&self, author: &Author) -> Result<Vec<RecordOffset>> {
        self.author.traverse_group(author)
    }

    /// Offsets of books tagged with `keyword`, in ISBN order.
    pub fn by_keyword(&self, keyword: &Keyword) -> Result<Vec<RecordOffset>> {
        self.keyword.traverse_group(keyword)
    }

    /// Offsets of every book, in ISBN order.
    pub fn all(&self) -> Result<Vec<RecordOffset>> {
        self.isbn.traverse()
    }

    /// Moves `book` to a new ISBN in every index.
    ///
    /// Returns `false` and changes nothing if `book` is not registered or `isbn`
    /// already belongs to a book, the current one included.
    pub fn set_isbn(&mut self, book: &BookKeys, isbn: Isbn) -> Result<bool> {
        let offset = match self.isbn.get(&book.isbn)? {
            Some(offset) if !self.isbn.contains(&isbn)? => offset,
            _ => return Ok(false),
        };
        self.isbn.erase(&book.isbn)?;
        self.isbn.insert(isbn, offset)?;
        if !book.name.is_empty() {
            Self::reindex(&mut self.name, &book.name, &book.isbn, &isbn, offset)?;
        }
        if !book.author.is_empty() {
            Self::reindex(&mut self.author, &book.author, &book.isbn, &isbn, offset)?;
        }
        for keyword in &book.keywords {
            Self::reindex(&mut self.keyword, keyword, &book.isbn, &isbn, offset)?;
        }
        debug!("book {} renamed to {}", book.isbn, isbn);
        Ok(true)
    }

    /// Replaces the indexed title of `book`. Returns `false` if it is not registered.
    pub fn set_name(&mut self, book: &BookKeys, name: BookName) -> Result<bool> {
        let offset = match self.isbn.get(&book.isbn)? {
            Some(offset) => offset,
            None => return Ok(false),
        };
        Self::replace(&mut self.name, &[book.name], &[name], &book.isbn, offset)?;
        Ok(true)
    }

    /// Replaces the indexed author of `book`. Returns `false` if it is not registered.
    pub fn set_author(&mut self, book: &BookKeys, author: Author) -> Result<bool> {
        let offset = match self.isbn.get(&book.isbn)? {
            Some(offset) => offset,
            None => return Ok(false),
        };
        Self::replace(&mut self.author, &[book.author], &[author], &book.isbn, offset)?;
        Ok(true)
    }

    /// Replaces the indexed keywords of `book`. Returns `false` if it is not registered.
    pub fn set_keywords(&mut self, book: &BookKeys, keywords: &[Keyword]) -> Result<bool> {
        let offset = match self.isbn.get(&book.isbn)? {
            Some(offset) => offset,
            None => return Ok(false),
        };
        Self::replace(&mut self.keyword, &book.keywords, keywords, &book.isbn, offset)?;
        Ok(true)
    }

    /// Makes every change so far durable.
    pub fn flush(&mut self) -> Result<()> {
        self.isbn.flush()?;
        self.name.flush()?;
        self.author.flush()?;
        self.keyword.flush()
    }

    fn reindex(
        index: &mut CompositeIndex<FixedStr<60>, Isbn, RecordOffset>,
        field: &FixedStr<60>,
        old: &Isbn,
        new: &Isbn,
        offset: RecordOffset,
    ) -> Result<()> {
        index.erase(field, old)?;
        Self::put(index, *field, *new, offset)
    }

    fn replace(
        index: &mut CompositeIndex<FixedStr<60>, Isbn, RecordOffset>,
        old: &[FixedStr<60>],
        new: &[FixedStr<60>],
        isbn: &Isbn,
        offset: RecordOffset,
    ) -> Result<()> {
        for field in old.iter().filter(|field| !field.is_empty()) {
            index.erase(field, isbn)?;
        }
        for field in new.iter().filter(|field| !field.is_empty()) {
            Self::put(index, *field, *isbn, offset)?;
        }
        Ok(())
    }

    // pairs stay unique even if the caller's view of the record is stale
    fn put(
        index: &mut CompositeIndex<FixedStr<60>, Isbn, RecordOffset>,
        field: FixedStr<60>,
        isbn: Isbn,
        offset: RecordOffset,
    ) -> Result<()> {
        if !index.modify(&field, &isbn, offset)? {
            index.insert(field, isbn, offset)?;
        }
        Ok(())
    }
}

/// Splits `a|b|c` into keywords.
///
/// An empty string means no keywords. Empty segments, repeated keywords and
/// keywords longer than [`Keyword::WIDTH`] bytes are rejected.
pub fn parse_keywords(text: &str) -> Result<Vec<Keyword>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let mut keywords: Vec<Keyword> = Vec::new();
    for part in text.split(KEYWORD_SEPARATOR) {
        if part.is_empty() {
            return Err(Error::invalid_key(format!("empty keyword in {:?}", text)).into());
        }
        let keyword = Keyword::new(part)?;
        if keywords.contains(&keyword) {
            let cause = format!("keyword {:?} repeats in {:?}", part, text);
            return Err(Error::invalid_key(cause).into());
        }
        keywords.push(keyword);
    }
    Ok(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isbn(text: &str) -> Isbn {
        Isbn::new(text).unwrap()
    }

    fn field(text: &str) -> FixedStr<60> {
        FixedStr::new(text).unwrap()
    }

    #[test]
    fn keywords_are_split() {
        let keywords = parse_keywords("rust|storage|disk").unwrap();
        let texts = keywords.iter().map(Keyword::as_str).collect::<Vec<_>>();
        assert_eq!(texts, vec!["rust", "storage", "disk"]);
        assert!(parse_keywords("").unwrap().is_empty());
    }

    #[test]
    fn malformed_keywords() {
        let long = "k".repeat(61);
        for text in ["a||b", "a|", "|a", "a|b|a", long.as_str()] {
            let err = parse_keywords(text).unwrap_err();
            let kind = err.downcast_ref::<Error>().map(Error::kind);
            assert!(matches!(kind, Some(ErrorKind::InvalidKey(_))), "{}", text);
        }
    }

    #[test]
    fn select_creates_once() {
        let dir = TempDir::new().unwrap();
        let mut catalog = BookCatalog::open(dir.path()).unwrap();
        assert_eq!(catalog.select_or_create(&isbn("978-0"), 10).unwrap(), 10);
        assert_eq!(catalog.select_or_create(&isbn("978-0"), 20).unwrap(), 10);
        assert_eq!(catalog.find(&isbn("978-0")).unwrap(), Some(10));
        assert_eq!(catalog.find(&isbn("978-1")).unwrap(), None);
    }

    #[test]
    fn secondary_fields_follow_changes() {
        let dir = TempDir::new().unwrap();
        let mut catalog = BookCatalog::open(dir.path()).unwrap();
        let mut book = BookKeys::new(isbn("b"));
        catalog.select_or_create(&book.isbn, 1).unwrap();
        catalog.select_or_create(&isbn("a"), 2).unwrap();

        assert!(catalog.set_name(&book, field("Dune")).unwrap());
        book.name = field("Dune");
        assert!(catalog.set_author(&book, field("Herbert")).unwrap());
        book.author = field("Herbert");
        let keywords = parse_keywords("sf|desert").unwrap();
        assert!(catalog.set_keywords(&book, &keywords).unwrap());
        book.keywords = keywords;

        assert_eq!(catalog.by_name(&field("Dune")).unwrap(), vec![1]);
        assert_eq!(catalog.by_author(&field("Herbert")).unwrap(), vec![1]);
        assert_eq!(catalog.by_keyword(&field("desert")).unwrap(), vec![1]);

        assert!(catalog.set_name(&book, field("Dune Messiah")).unwrap());
        book.name = field("Dune Messiah");
        assert!(catalog.by_name(&field("Dune")).unwrap().is_empty());
        assert_eq!(catalog.by_name(&field("Dune Messiah")).unwrap(), vec![1]);

        assert!(catalog.set_keywords(&book, &[]).unwrap());
        book.keywords.clear();
        assert!(catalog.by_keyword(&field("sf")).unwrap().is_empty());

        let ghost = BookKeys::new(isbn("none"));
        assert!(!catalog.set_name(&ghost, field("x")).unwrap());
    }

    #[test]
    fn isbn_change_rewrites_every_index() {
        let dir = TempDir::new().unwrap();
        let mut catalog = BookCatalog::open(dir.path()).unwrap();
        let book = BookKeys {
            isbn: isbn("old"),
            name: field("Emma"),
            author: field("Austen"),
            keywords: parse_keywords("novel|classic").unwrap(),
        };
        catalog.select_or_create(&book.isbn, 5).unwrap();
        catalog.set_name(&book, book.name).unwrap();
        catalog.set_author(&book, book.author).unwrap();
        catalog.set_keywords(&book, &book.keywords).unwrap();
        catalog.select_or_create(&isbn("taken"), 6).unwrap();

        assert!(!catalog.set_isbn(&book, isbn("taken")).unwrap());
        assert!(!catalog.set_isbn(&book, isbn("old")).unwrap());
        assert!(catalog.set_isbn(&book, isbn("new")).unwrap());

        assert_eq!(catalog.find(&isbn("old")).unwrap(), None);
        assert_eq!(catalog.find(&isbn("new")).unwrap(), Some(5));
        assert_eq!(catalog.name.entries().unwrap(), vec![(field("Emma"), isbn("new"), 5)]);
        assert_eq!(catalog.by_author(&field("Austen")).unwrap(), vec![5]);
        assert_eq!(catalog.by_keyword(&field("classic")).unwrap(), vec![5]);
        assert_eq!(catalog.all().unwrap(), vec![5, 6]);
    }

    #[test]
    fn authors_group_in_isbn_order() {
        let dir = TempDir::new().unwrap();
        let mut catalog = BookCatalog::open(dir.path()).unwrap();
        for (i, code) in ["c", "a", "d", "b"].iter().enumerate() {
            let book = BookKeys::new(isbn(code));
            let offset = i as u32;
            catalog.select_or_create(&book.isbn, offset).unwrap();
            catalog.set_author(&book, field("Anon")).unwrap();
        }
        assert_eq!(catalog.by_author(&field("Anon")).unwrap(), vec![1, 3, 0, 2]);
        catalog.flush().unwrap();
    }
}
