//! Builds a small page outline, reorders it, links blocks with tags and
//! prints the result.

use nutty::{BlockContent, BlockTree, ContentBlock, NuttyId};

fn label(block: &ContentBlock) -> String {
    let kind = match &block.content {
        BlockContent::Page { .. } => "page",
        BlockContent::Heading { .. } => "heading",
        BlockContent::Paragraph { .. } => "paragraph",
    };
    format!(
        "{:<10} {:<8} {:<9} {}",
        block.id().short_code(),
        block.f_index.as_str(),
        kind,
        block.content.text()
    )
}

fn print_tree(tree: &BlockTree, parent: Option<&NuttyId>, depth: usize) {
    for block in tree.children(parent) {
        println!("{}{}", "  ".repeat(depth), label(block));
        print_tree(tree, Some(block.id()), depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = BlockTree::new();

    let page = tree.append(None, BlockContent::Page { title: "Groceries".into() })?;
    let fruit = tree.append(Some(page), BlockContent::Heading { markdown: "## Fruit".into() })?;
    let veg = tree.append(Some(page), BlockContent::Heading { markdown: "## Vegetables".into() })?;
    tree.append(Some(fruit), BlockContent::Paragraph { markdown: "apples".into() })?;
    let carrots = tree.append(Some(veg), BlockContent::Paragraph { markdown: "carrots".into() })?;
    tree.prepend(Some(veg), BlockContent::Paragraph { markdown: "beans".into() })?;

    println!("Before:");
    print_tree(&tree, None, 1);

    // Move vegetables above fruit; only the heading's key changes.
    tree.move_block(veg, Some(page), None, Some(fruit))?;
    let note = format!(
        "see [[{}|carrots]] and [[{}]]",
        carrots.short_code(),
        fruit.short_code()
    );
    let linked = tree.append(Some(page), BlockContent::Paragraph { markdown: note })?;

    println!("\nAfter:");
    print_tree(&tree, None, 1);

    println!("\nReferences of the last paragraph:");
    for block in tree.references(&linked)? {
        println!("  {}", label(block));
    }
    println!("\nBacklinks of carrots:");
    for block in tree.backlinks(&carrots)? {
        println!("  {}", label(block));
    }
    Ok(())
}
