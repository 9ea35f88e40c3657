use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use state_inspect_path::{collect_all_paths, ExpandedPaths, Inspectable, Shape};

/// Minimal aliasing graph: containers are shared handles.
#[derive(Clone)]
enum Node {
    Leaf,
    List(Rc<RefCell<Vec<Node>>>),
    Map(Rc<RefCell<Vec<(String, Node)>>>),
}

impl Inspectable for Node {
    fn shape(&self) -> Shape<Self> {
        match self {
            Node::Leaf => Shape::Leaf,
            Node::List(items) => Shape::Array(items.borrow().clone()),
            Node::Map(entries) => Shape::Object(entries.borrow().clone()),
        }
    }

    fn container_id(&self) -> Option<usize> {
        match self {
            Node::Leaf => None,
            Node::List(items) => Some(Rc::as_ptr(items) as usize),
            Node::Map(entries) => Some(Rc::as_ptr(entries) as usize),
        }
    }
}

#[test]
fn self_reference_terminates() {
    let entries = Rc::new(RefCell::new(vec![("name".to_string(), Node::Leaf)]));
    let root = Node::Map(entries.clone());
    entries.borrow_mut().push(("me".to_string(), root.clone()));

    let paths = collect_all_paths(&root, "root");
    let listed: Vec<_> = paths.iter().map(String::as_str).collect();
    assert_eq!(listed, vec!["root", "name", "me"]);
    assert_eq!(paths.iter().filter(|p| p.as_str() == "me").count(), 1);
}

#[test]
fn back_reference_through_array_terminates() {
    let list = Rc::new(RefCell::new(vec![Node::Leaf]));
    let entries = Rc::new(RefCell::new(vec![("items".to_string(), Node::List(list.clone()))]));
    let root = Node::Map(entries);
    list.borrow_mut().push(root.clone());

    let paths = collect_all_paths(&root, "root");
    let listed: Vec<_> = paths.iter().map(String::as_str).collect();
    assert_eq!(listed, vec!["root", "items", "items[0]", "items[1]"]);
}

#[test]
fn shared_subtree_is_listed_once_under_first_owner() {
    let shared = Node::List(Rc::new(RefCell::new(vec![Node::Leaf])));
    let root = Node::Map(Rc::new(RefCell::new(vec![
        ("a".to_string(), shared.clone()),
        ("b".to_string(), shared),
    ])));

    let paths = collect_all_paths(&root, "root");
    let listed: Vec<_> = paths.iter().map(String::as_str).collect();
    assert_eq!(listed, vec!["root", "a", "a[0]", "b"]);
}

#[test]
fn edit_then_expand_flow() {
    let doc = json!({"todos": [{"text": "a"}]});
    let mut expanded = ExpandedPaths::all(&&doc);
    assert!(expanded.contains("todos[0].text"));

    let replacement = json!({"text": "a", "tags": ["x"]});
    expanded.apply_edit("todos[0]", Some(&replacement));
    assert!(expanded.contains("todos[0].tags"));
    assert!(expanded.contains("todos[0].tags[0]"));

    expanded.apply_edit("todos[0]", Some(&json!(false)));
    assert!(!expanded.contains("todos[0]"));
    assert!(expanded.contains("root"));

    let mut fresh = ExpandedPaths::new();
    fresh.apply_edit("todos[0].meta.tags", Some(&json!(["y"])));
    assert!(fresh.contains("todos[0]"));
    assert!(fresh.contains("todos[0].meta"));
    assert!(fresh.contains("todos[0].meta.tags[0]"));

    fresh.apply_edit("settings.theme.dark", Some(&json!(true)));
    assert!(fresh.contains("settings"));
    assert!(fresh.contains("settings.theme"));
    assert!(!fresh.contains("settings.theme.dark"));
}
