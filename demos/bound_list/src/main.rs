use std::rc::Rc;

use trellis_core::*;
use trellis_view::*;

#[derive(PartialEq)]
struct Task {
    title: Property<String>,
    done: Property<bool>,
}

fn task(title: &str, done: bool) -> Rc<Task> {
    Rc::new(Task {
        title: property(title.to_string()),
        done: property(done),
    })
}

struct Board {
    name: Property<String>,
    tasks: Property<Vec<Rc<Task>>>,
}

fn task_row(b: &mut ViewBuilder<'_>, task: &Rc<Task>) -> trellis_view::Result<()> {
    Paragraph::containing((
        Display::of_obj(bind!(task.done)).using(|b, done| {
            b.add_literal(if *done { "[x] " } else { "[ ] " })?;
            Ok(())
        }),
        Display::of(bind!(task.title)).when_empty("(untitled)"),
    ))
    .show(b)
}

fn board(board: &Rc<Board>) -> Flow {
    Div::containing((
        Paragraph::containing(Display::of(bind!(board.name)))
            .bold()
            .font_size(Units::points(14.0)),
        Display::of_seq(bind!(board.tasks)).using(task_row),
        Block::new(Color::from_hex("#333333"), Units::inches(6.0), Units::points(1.0)),
        LazyDisplay::of(bind!(board.tasks)).using(task_row).italic(),
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting bound list demo");

    let inbox = Rc::new(Board {
        name: property("Inbox".to_string()),
        tasks: property(vec![task("write", true), task("test", false)]),
    });

    let view = RootView::default();
    view.show(&board(&inbox))?;
    println!("{}", view.outline());

    inbox.tasks.update(|t| t.push(task("ship", false)));
    inbox.tasks.with(|t| t[1].done.set(true));
    inbox.name.set("Inbox (3)".to_string());

    let lazy = {
        let tree = view.tree();
        let div = tree.children(tree.root_box())[0];
        tree.children(div).last().copied()
    };
    if let Some(lazy) = lazy {
        view.expand(lazy, 2)?;
    }
    println!("{}", view.outline());

    let caret = SelectionBuilder::in_root(&view)
        .child(0)
        .child(0)
        .offset(5)
        .install()?;
    log::info!("caret at {caret:?}");

    inbox.tasks.update(|t| {
        t.remove(0);
    });
    println!("{}", view.outline());
    println!("rebuilds: {}", view.tree().rebuild_count());
    Ok(())
}
