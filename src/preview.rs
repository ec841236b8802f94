use crate::vfs::{Encoding, VirtualFile};
use colored::Colorize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write;
use std::rc::Rc;

/// Represents a node in the tree (either file or directory).
#[derive(Debug)]
struct TreeNode {
    name: String,
    children: Vec<Rc<RefCell<TreeNode>>>,
    kind: NodeKind,
}
#[derive(Debug, Clone, Copy, PartialEq)]
enum NodeKind {
    Directory,
    File(Encoding),
}
impl TreeNode {
    fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            children: Vec::new(),
            kind,
        }
    }
}

/// Build the entry tree for an archive, returning the root node.
///
/// Directories are synthesized from `/` separators. A path seen twice maps to a
/// single node, like the archive entry it ends up as.
fn build_tree(files: &[VirtualFile], root_name: &str) -> Rc<RefCell<TreeNode>> {
    let root = Rc::new(RefCell::new(TreeNode::new(
        root_name.to_string(),
        NodeKind::Directory,
    )));

    // map full path to node
    let mut lookup: HashMap<String, Rc<RefCell<TreeNode>>> = HashMap::new();

    for file in files {
        let segments: Vec<&str> = file
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut parent = Rc::clone(&root);
        let mut full_path = String::new();

        for (i, segment) in segments.iter().enumerate() {
            if !full_path.is_empty() {
                full_path.push('/');
            }
            full_path.push_str(segment);

            let is_leaf = i == segments.len() - 1;

            let node = match lookup.get(&full_path) {
                Some(node) => Rc::clone(node),
                None => {
                    let kind = if is_leaf {
                        NodeKind::File(file.encoding)
                    } else {
                        NodeKind::Directory
                    };
                    let node = Rc::new(RefCell::new(TreeNode::new(segment.to_string(), kind)));

                    parent.borrow_mut().children.push(Rc::clone(&node));
                    lookup.insert(full_path.clone(), Rc::clone(&node));

                    node
                }
            };

            if is_leaf {
                node.borrow_mut().kind = NodeKind::File(file.encoding);
            }

            parent = node;
        }
    }

    root
}

/// Render the tree with a nice ASCII style.
fn render_tree(node: &Rc<RefCell<TreeNode>>, prefix: &str, is_last: bool, out: &mut String) {
    let node_borrow = node.borrow();

    let connector = if is_last {
        "└── ".yellow()
    } else {
        "├── ".yellow()
    };
    let name = match node_borrow.kind {
        NodeKind::Directory => node_borrow.name.blue(),
        NodeKind::File(Encoding::Text) => node_borrow.name.green(),
        NodeKind::File(Encoding::Base64) => node_borrow.name.magenta(),
    };
    let _ = writeln!(out, "{}{}{}", prefix.yellow(), connector, name);

    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let len = node_borrow.children.len();
    for (i, child) in node_borrow.children.iter().enumerate() {
        let last = i == len - 1;
        render_tree(child, &child_prefix, last, out);
    }
}

/// Renders the archive layout of `files` under a root named `archive_name`.
pub fn tree(files: &[VirtualFile], archive_name: &str) -> String {
    let root = build_tree(files, archive_name);

    let mut out = String::new();
    render_tree(&root, "", true, &mut out);

    out
}

pub fn preview_as_tree(files: &[VirtualFile], archive_name: &str) {
    println!(
        "Legend: {} = (directory), {} = (text file), {} = (binary asset)",
        "blue".blue(),
        "green".green(),
        "magenta".magenta()
    );

    let fancy_prompt = format!(
        "{} {}\n",
        "┌─".bold().bright_blue(),
        "Preview".bold().bright_blue(),
    );

    println!("{}", fancy_prompt);

    print!("{}", tree(files, archive_name));

    println!();
}
