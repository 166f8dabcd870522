use autofolder_core::db::open_db_in_memory;
use autofolder_core::{
    FolderMaterializer, FolderPart, PartFormats, Resource, ResourceStore, SqliteResourceStore,
};
use chrono::{NaiveDate, NaiveDateTime};

const GENERATED_TEMPLATE: i64 = 9;

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn seed_root(store: &SqliteResourceStore<'_>) -> Resource {
    let mut root = Resource::new(2, "News").with_alias("news");
    root.is_folder = true;
    root.published = true;
    store.create_resource(&root).unwrap();
    root
}

fn seed_item(store: &SqliteResourceStore<'_>, root: &Resource, title: &str) -> Resource {
    let item = Resource::new(3, title).under(root.id);
    store.create_resource(&item).unwrap();
    item
}

#[test]
fn year_month_chain_uses_default_formats() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    let formats = PartFormats::default();
    let materializer = FolderMaterializer::new(&store, GENERATED_TEMPLATE, &formats);

    let root = seed_root(&store);
    let mut item = seed_item(&store, &root, "Summer launch");

    let placement = materializer
        .materialize(
            &mut item,
            &[FolderPart::Year, FolderPart::Month],
            root.clone(),
            &date(2023, 6, 15),
        )
        .unwrap();

    assert_eq!(placement.chain.len(), 2);
    assert_eq!(placement.created, placement.chain);

    let year = store.get_resource(placement.chain[0]).unwrap().unwrap();
    let month = store.get_resource(placement.chain[1]).unwrap().unwrap();
    assert_eq!(year.parent, Some(root.id));
    assert_eq!(month.parent, Some(year.id));
    assert_eq!((year.alias.as_str(), year.page_title.as_str()), ("2023", "2023"));
    assert_eq!((month.alias.as_str(), month.page_title.as_str()), ("06", "June"));
    assert_eq!(month.long_title, "June");
    assert_eq!(month.menu_title, "June");

    for folder in [&year, &month] {
        assert!(folder.is_folder);
        assert!(folder.published);
        assert!(!folder.searchable);
        assert_eq!(folder.template, GENERATED_TEMPLATE);
    }

    let stored_item = store.get_resource(item.id).unwrap().unwrap();
    assert_eq!(stored_item.parent, Some(month.id));
    assert_eq!(stored_item.menu_index, 1);
    assert_eq!(placement.folder_id, month.id);
    assert_eq!(placement.menu_index, 1);
}

#[test]
fn repeated_materialization_creates_no_duplicate_folders() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    let formats = PartFormats::default();
    let materializer = FolderMaterializer::new(&store, GENERATED_TEMPLATE, &formats);
    let structure = [FolderPart::Year, FolderPart::Month, FolderPart::Day];

    let root = seed_root(&store);
    let mut item = seed_item(&store, &root, "Post");

    let first = materializer
        .materialize(&mut item, &structure, root.clone(), &date(2023, 6, 15))
        .unwrap();
    let second = materializer
        .materialize(&mut item, &structure, root.clone(), &date(2023, 6, 15))
        .unwrap();

    assert_eq!(first.created.len(), 3);
    assert!(second.created.is_empty());
    assert_eq!(first.chain, second.chain);
    assert_eq!(first.menu_index, 1);
    assert_eq!(second.menu_index, 2);

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM resources WHERE template_id = ?1;",
            [GENERATED_TEMPLATE],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn folder_menu_index_follows_date_not_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    let formats = PartFormats::default();
    let materializer = FolderMaterializer::new(&store, GENERATED_TEMPLATE, &formats);
    let structure = [FolderPart::Year, FolderPart::Month, FolderPart::Day];

    let root = seed_root(&store);
    for (title, when) in [
        ("later", date(2024, 11, 30)),
        ("earlier", date(2023, 3, 7)),
        ("middle", date(2024, 2, 9)),
    ] {
        let mut item = seed_item(&store, &root, title);
        materializer
            .materialize(&mut item, &structure, root.clone(), &when)
            .unwrap();
    }

    let years = store.list_children(root.id).unwrap();
    let year_aliases = years.iter().map(|year| year.alias.as_str()).collect::<Vec<_>>();
    assert_eq!(year_aliases, vec!["2023", "2024"]);
    assert_eq!(years[0].menu_index, 2023);
    assert_eq!(years[1].menu_index, 2024);

    let months_2024 = store.list_children(years[1].id).unwrap();
    let month_indexes = months_2024
        .iter()
        .map(|month| (month.alias.as_str(), month.menu_index))
        .collect::<Vec<_>>();
    assert_eq!(month_indexes, vec![("02", 2), ("11", 11)]);

    let days = store.list_children(months_2024[1].id).unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!((days[0].alias.as_str(), days[0].menu_index), ("30", 30));
}

#[test]
fn existing_folder_is_reused_and_item_appended_after_siblings() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    let formats = PartFormats::default();
    let materializer = FolderMaterializer::new(&store, GENERATED_TEMPLATE, &formats);

    let root = seed_root(&store);
    let mut handmade = Resource::new(5, "Year 2023").under(root.id).with_alias("2023");
    handmade.is_folder = true;
    store.create_resource(&handmade).unwrap();
    let mut sibling = Resource::new(3, "Older post").under(handmade.id);
    sibling.menu_index = 7;
    store.create_resource(&sibling).unwrap();

    let mut item = seed_item(&store, &root, "New post");
    let placement = materializer
        .materialize(&mut item, &[FolderPart::Year], root.clone(), &date(2023, 1, 1))
        .unwrap();

    assert!(placement.created.is_empty());
    assert_eq!(placement.folder_id, handmade.id);
    assert_eq!(placement.menu_index, 8);
    let reused = store.get_resource(handmade.id).unwrap().unwrap();
    assert_eq!(reused, handmade);
}

#[test]
fn empty_structure_places_item_under_root() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    let formats = PartFormats::default();
    let materializer = FolderMaterializer::new(&store, GENERATED_TEMPLATE, &formats);

    let root = seed_root(&store);
    let mut item = seed_item(&store, &root, "Flat");

    let placement = materializer
        .materialize(&mut item, &[], root.clone(), &date(2023, 6, 15))
        .unwrap();

    assert_eq!(placement.folder_id, root.id);
    assert!(placement.chain.is_empty());
    assert!(placement.created.is_empty());
    // The item is already a child of root, so it appends after itself.
    assert_eq!(placement.menu_index, 1);
    assert_eq!(item.parent, Some(root.id));
}

#[test]
fn custom_formats_drive_alias_and_title() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    let mut formats = PartFormats::default();
    formats.month.alias = "n-M".to_string();
    formats.month.title = "F Y".to_string();
    let materializer = FolderMaterializer::new(&store, GENERATED_TEMPLATE, &formats);

    let root = seed_root(&store);
    let mut item = seed_item(&store, &root, "Post");
    let placement = materializer
        .materialize(&mut item, &[FolderPart::Month], root.clone(), &date(2023, 6, 15))
        .unwrap();

    let month = store.get_resource(placement.folder_id).unwrap().unwrap();
    assert_eq!(month.alias, "6-Jun");
    assert_eq!(month.page_title, "June 2023");
    assert_eq!(month.menu_index, 6);
}

#[test]
fn item_sharing_a_folder_alias_is_not_used_as_its_own_folder() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteResourceStore::try_new(&conn).unwrap();
    let formats = PartFormats::default();
    let materializer = FolderMaterializer::new(&store, GENERATED_TEMPLATE, &formats);

    let root = seed_root(&store);
    let mut item = Resource::new(3, "Year in review").under(root.id).with_alias("2023");
    store.create_resource(&item).unwrap();

    let placement = materializer
        .materialize(
            &mut item,
            &[FolderPart::Year, FolderPart::Month],
            root.clone(),
            &date(2023, 6, 15),
        )
        .unwrap();

    assert!(!placement.chain.contains(&item.id));
    assert_eq!(placement.created.len(), 2);

    let year = store.get_resource(placement.chain[0]).unwrap().unwrap();
    let month = store.get_resource(placement.chain[1]).unwrap().unwrap();
    assert_eq!(year.parent, Some(root.id));
    assert_eq!(year.alias, "2023");
    assert_eq!(month.parent, Some(year.id));

    let stored_item = store.get_resource(item.id).unwrap().unwrap();
    assert_eq!(stored_item.parent, Some(month.id));
}
