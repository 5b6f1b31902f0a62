use std::{collections::HashMap, sync::Arc};

use contacts_router::{normalize, RouteTable, RouteTemplate};

type Handler = Arc<dyn Fn() -> &'static str + Send + Sync>;

fn handler(name: &'static str) -> Handler {
    Arc::new(move || name)
}

#[test]
fn test_contacts_routes() {
    let mut table: RouteTable<Handler> = RouteTable::new();
    table.add("", "GET", handler("list"));
    table.add("", "POST", handler("create"));
    table.add("/{id}", "GET", handler("get"));
    table.add("/{id}/contacts/{contactId}", "GET", handler("contact"));

    let m = table.resolve("/28/contacts/1", "GET").unwrap();
    assert_eq!((m.handler())(), "contact");
    assert_eq!(
        m.vars,
        HashMap::from([
            ("id".to_owned(), "28".to_owned()),
            ("contactId".to_owned(), "1".to_owned()),
        ])
    );

    assert_eq!((table.resolve("", "POST").unwrap().handler())(), "create");
    assert_eq!((table.resolve("/", "GET").unwrap().handler())(), "list");

    let Err(err) = table.resolve("/28/contacts", "GET") else {
        panic!("one segment short must not match");
    };
    assert_eq!(err.status(), 404);
    assert_eq!(err.message(), "Page not found");
}

#[test]
fn test_first_registered_wins() {
    let mut table: RouteTable<Handler> = RouteTable::new();
    let fst = handler("fst");
    table.add("/{id}", "GET", Arc::clone(&fst));
    table.add("/{id}", "GET", handler("snd"));

    let m = table.resolve("/1", "GET").unwrap();
    assert!(Arc::ptr_eq(m.handler(), &fst));
}

#[test]
fn test_root_templates_are_equivalent() {
    let empty = RouteTemplate::new("", "GET", ());
    let slash = RouteTemplate::new("/", "GET", ());
    assert_eq!(empty, slash);
    assert_eq!(normalize("/"), normalize(""));
}
