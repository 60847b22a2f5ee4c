#[cfg(test)]
mod tests {
    use crate::*;
    use std::any::Any;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use trellis_core::{
        BroadcastBridge, Color, EventBridge, FW_BOLD, Handler, MemberExpr, MultiString,
        Observable, PropBroadcast, Property, StyleProp, StyledText, SubId, Units, Ws, bind,
        property,
    };

    #[derive(PartialEq)]
    struct Person {
        name: Property<String>,
    }

    fn person(name: &str) -> Rc<Person> {
        Rc::new(Person {
            name: property(name.to_string()),
        })
    }

    struct Roster {
        people: Property<Vec<Rc<Person>>>,
    }

    fn roster(people: Vec<Rc<Person>>) -> Rc<Roster> {
        Rc::new(Roster {
            people: property(people),
        })
    }

    fn name_item(b: &mut ViewBuilder<'_>, p: &Rc<Person>) -> Result<()> {
        Paragraph::containing(Display::of(bind!(p.name))).show(b)
    }

    fn texts(tree: &ViewTree, parent: BoxId) -> Vec<String> {
        tree.children(parent)
            .iter()
            .map(|p| tree.para_text(*p))
            .collect()
    }

    fn first_child(view: &RootView) -> BoxId {
        let tree = view.tree();
        tree.children(tree.root_box())[0]
    }

    fn find_hookup(tree: &ViewTree, pred: impl Fn(&HookupKind) -> bool) -> HookupId {
        tree.hookups()
            .iter()
            .find(|(_, n)| pred(n.kind()))
            .map(|(id, _)| id)
            .unwrap()
    }

    /// Test channel that records installs and keeps every handler it was
    /// ever given, so stale ones can be fired on purpose.
    #[derive(Default)]
    struct Spy {
        log: RefCell<Vec<&'static str>>,
        live: RefCell<Vec<(SubId, Handler)>>,
        ever: RefCell<Vec<Handler>>,
        next: Cell<SubId>,
    }

    impl Spy {
        fn fire(&self) {
            let live: Vec<Handler> = self.live.borrow().iter().map(|(_, h)| h.clone()).collect();
            for h in live {
                h();
            }
        }

        fn fire_stale(&self) {
            let all = self.ever.borrow().clone();
            for h in all {
                h();
            }
        }
    }

    impl Observable for Spy {
        fn subscribe(&self, handler: Handler) -> SubId {
            let id = self.next.get();
            self.next.set(id + 1);
            self.log.borrow_mut().push("install");
            self.live.borrow_mut().push((id, handler.clone()));
            self.ever.borrow_mut().push(handler);
            id
        }

        fn unsubscribe(&self, id: SubId) {
            self.log.borrow_mut().push("uninstall");
            self.live.borrow_mut().retain(|(i, _)| *i != id);
        }
    }

    struct SpyBridge(Rc<Spy>);

    impl EventBridge for SpyBridge {
        fn hookup_event_actions(
            &self,
            _member: &str,
            _target: &Rc<dyn Any>,
        ) -> Option<Rc<dyn Observable>> {
            Some(self.0.clone())
        }
    }

    struct Label {
        text: RefCell<String>,
    }

    fn label_text(label: &Rc<Label>) -> MemberExpr<String> {
        MemberExpr::field(label, "text", |l| l.text.borrow().clone())
    }

    #[test]
    fn test_literal_paragraph() {
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of("Hello")))
            .unwrap();

        let tree = view.tree();
        let root = tree.children(tree.root_box());
        assert_eq!(root.len(), 1);
        let runs = tree.runs(root[0]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello");
        assert_eq!(tree.bound_hookup_count(), 0);
        assert_eq!(tree.binding_count(), 0);
    }

    #[test]
    fn test_bound_text_rebuilds_in_place() {
        let m = person("A");
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of(bind!(m.name))))
            .unwrap();

        let para = first_child(&view);
        let hookups = {
            let tree = view.tree();
            assert_eq!(tree.para_text(para), "A");
            tree.hookups().len()
        };

        m.name.set("B".to_string());

        let tree = view.tree();
        assert_eq!(tree.children(tree.root_box()), &[para]);
        assert_eq!(tree.para_text(para), "B");
        assert_eq!(tree.hookups().len(), hookups);
        assert_eq!(tree.rebuild_count(), 1);
    }

    #[test]
    fn test_unchanged_value_is_a_no_op() {
        let m = person("A");
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of(bind!(m.name))))
            .unwrap();

        m.name.set("A".to_string());
        assert_eq!(view.tree().rebuild_count(), 0);
    }

    #[test]
    fn test_selection_in_first_leaf() {
        let m = person("Hello");
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of(bind!(m.name))))
            .unwrap();

        let sel = SelectionBuilder::in_root(&view)
            .child(0)
            .offset(3)
            .selection()
            .unwrap();

        let tree = view.tree();
        let leaf = find_hookup(&tree, |k| matches!(k, HookupKind::Text(_)));
        let ip = InsertionPoint {
            hookup: leaf,
            offset: 3,
        };
        assert_eq!(sel, Selection::Insertion(ip));

        let para = tree.children(tree.root_box())[0];
        assert_eq!(ip.locate(&tree), Some((para, 0, 3)));
    }

    #[test]
    fn test_removed_item_leaves_its_successor_in_place() {
        let (a, b) = (person("a"), person("b"));
        let r = roster(vec![a, b]);
        let view = RootView::default();
        view.show(&Div::containing(
            Display::of_seq(bind!(r.people)).using(name_item),
        ))
        .unwrap();

        let div = first_child(&view);
        let (b_para, seq) = {
            let tree = view.tree();
            assert_eq!(texts(&tree, div), ["a", "b"]);
            let seq = find_hookup(&tree, |k| matches!(k, HookupKind::Sequence(_)));
            assert_eq!(tree.item_count(seq), 2);
            (tree.children(div)[1], seq)
        };

        r.people.update(|v| {
            v.remove(0);
        });

        let tree = view.tree();
        assert_eq!(tree.children(div), &[b_para]);
        assert_eq!(texts(&tree, div), ["b"]);
        assert_eq!(tree.item_count(seq), 1);
    }

    #[test]
    fn test_inserted_item_lands_between_neighbors() {
        let (a, b, c) = (person("a"), person("b"), person("c"));
        let r = roster(vec![a.clone(), c.clone()]);
        let view = RootView::default();
        view.show(&Div::containing((
            Paragraph::containing(Display::of("head")),
            Display::of_seq(bind!(r.people)).using(name_item),
            Paragraph::containing(Display::of("tail")),
        )))
        .unwrap();

        r.people.set(vec![a, b, c]);

        let tree = view.tree();
        let div = tree.children(tree.root_box())[0];
        assert_eq!(texts(&tree, div), ["head", "a", "b", "c", "tail"]);
    }

    #[test]
    fn test_sequence_of_runs_in_one_paragraph() {
        let (a, b, c) = (person("a"), person("b"), person("c"));
        let r = roster(vec![a.clone(), c.clone()]);
        let view = RootView::default();
        view.show(&Paragraph::containing((
            Display::of("["),
            Display::of_seq(bind!(r.people)).using(|b, p| Display::of(bind!(p.name)).show(b)),
            Display::of("]"),
        )))
        .unwrap();

        let para = first_child(&view);
        assert_eq!(view.tree().para_text(para), "[ac]");

        r.people.set(vec![a.clone(), b, c]);
        assert_eq!(view.tree().para_text(para), "[abc]");

        a.name.set("A".to_string());
        assert_eq!(view.tree().para_text(para), "[Abc]");

        r.people.set(Vec::new());
        assert_eq!(view.tree().para_text(para), "[]");
    }

    #[test]
    fn test_box_order_follows_declaration() {
        let view = RootView::default();
        view.show(&Div::containing((
            Paragraph::containing(Display::of("one")),
            Div::containing(Paragraph::containing(Display::of("two"))),
            Block::new(Color::BLUE, Units::points(4.0), Units::points(2.0)),
            Paragraph::containing(Display::of("three")),
        )))
        .unwrap();

        insta::assert_snapshot!(view.outline().trim_end(), @r#"
        root
          div
            para "one"
            div
              para "two"
            block 4pt x 2pt
            para "three"
        "#);
    }

    #[test]
    fn test_item_hookups_match_source() {
        let r = roster(vec![person("x"), person("y"), person("z")]);
        let empty = roster(Vec::new());
        let view = RootView::default();
        view.show(&Div::containing(
            Display::of_seq(bind!(r.people)).using(name_item),
        ))
        .unwrap();
        view.show(&Div::containing(
            Display::of_seq(bind!(empty.people)).using(name_item),
        ))
        .unwrap();

        let tree = view.tree();
        let seqs: Vec<HookupId> = tree
            .hookups()
            .iter()
            .filter(|(_, n)| matches!(n.kind(), HookupKind::Sequence(_)))
            .map(|(id, _)| id)
            .collect();
        let mut counts: Vec<usize> = seqs.iter().map(|s| tree.item_count(*s)).collect();
        counts.sort();
        assert_eq!(counts, [0, 3]);
    }

    #[test]
    fn test_empty_lazy_sequence_places_no_box() {
        let r = roster(Vec::new());
        let view = RootView::default();
        view.show(&Div::containing(
            LazyDisplay::of(bind!(r.people)).using(name_item),
        ))
        .unwrap();

        let div = first_child(&view);
        assert!(view.tree().children(div).is_empty());

        r.people.update(|v| v.push(person("late")));

        let tree = view.tree();
        let lazy = tree.children(div)[0];
        assert_eq!(tree.lazy_len(lazy), Some(1));
    }

    #[test]
    fn test_lazy_items_expand_on_demand() {
        let r = roster(vec![person("a"), person("b"), person("c")]);
        let view = RootView::default();
        view.show(&Div::containing(
            LazyDisplay::of(bind!(r.people)).using(name_item),
        ))
        .unwrap();

        let div = first_child(&view);
        let lazy = {
            let tree = view.tree();
            let lazy = tree.children(div)[0];
            assert_eq!(tree.lazy_len(lazy), Some(3));
            assert!(tree.children(lazy).is_empty());
            lazy
        };

        let second = view.expand(lazy, 1).unwrap();
        assert_eq!(view.expand(lazy, 1).unwrap(), second);
        view.expand(lazy, 0).unwrap();
        assert_eq!(texts(&view.tree(), lazy), ["a", "b"]);

        assert!(matches!(
            view.expand(lazy, 3),
            Err(ViewError::ItemIndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(view.expand(div, 0), Err(ViewError::NotLazy(_))));

        r.people.update(|v| v.push(person("d")));

        let tree = view.tree();
        let fresh = tree.children(div)[0];
        assert!(!tree.boxes().contains(lazy));
        assert_eq!(tree.lazy_len(fresh), Some(4));
        assert!(tree.children(fresh).is_empty());
    }

    #[test]
    fn test_sibling_subtrees_are_untouched() {
        let (a, b) = (person("a"), person("b"));
        let view = RootView::default();
        view.show(&Div::containing((
            Paragraph::containing(Display::of(bind!(a.name))),
            Paragraph::containing(Display::of(bind!(b.name))),
        )))
        .unwrap();

        let div = first_child(&view);
        let (pa, pb, ra, rb) = {
            let tree = view.tree();
            let kids = tree.children(div);
            let (pa, pb) = (kids[0], kids[1]);
            (pa, pb, tree.runs(pa)[0].id, tree.runs(pb)[0].id)
        };

        a.name.set("A".to_string());

        let tree = view.tree();
        assert_eq!(tree.children(div), &[pa, pb]);
        assert_ne!(tree.runs(pa)[0].id, ra);
        assert_eq!(tree.runs(pb)[0].id, rb);
        assert_eq!(tree.rebuild_count(), 1);
    }

    #[test]
    fn test_stale_handler_is_a_no_op() {
        struct Holder {
            shown: Property<bool>,
        }
        let spy = Rc::new(Spy::default());
        let label = Rc::new(Label {
            text: RefCell::new("one".to_string()),
        });
        let holder = Rc::new(Holder {
            shown: property(true),
        });

        let view = RootView::new(ViewConfig::default().with_bridge(SpyBridge(spy.clone())));
        let l = label.clone();
        view.show(&Div::containing(Display::of_obj(bind!(holder.shown)).using(
            move |b, shown| {
                if *shown {
                    Paragraph::containing(Display::of(label_text(&l))).show(b)
                } else {
                    Ok(())
                }
            },
        )))
        .unwrap();
        assert_eq!(*spy.log.borrow(), ["install"]);

        *label.text.borrow_mut() = "two".to_string();
        spy.fire();
        let div = first_child(&view);
        assert_eq!(texts(&view.tree(), div), ["two"]);
        assert_eq!(view.tree().rebuild_count(), 1);

        holder.shown.set(false);
        assert_eq!(*spy.log.borrow(), ["install", "uninstall"]);
        assert!(view.tree().children(div).is_empty());
        assert_eq!(view.tree().rebuild_count(), 2);

        *label.text.borrow_mut() = "three".to_string();
        spy.fire();
        spy.fire_stale();
        let tree = view.tree();
        assert_eq!(tree.rebuild_count(), 2);
        assert!(tree.children(div).is_empty());
        assert_eq!(tree.binding_count(), 1);
    }

    #[test]
    fn test_teardown_precedes_reinstall() {
        struct Holder {
            version: Property<u32>,
        }
        let spy = Rc::new(Spy::default());
        let label = Rc::new(Label {
            text: RefCell::new("v".to_string()),
        });
        let holder = Rc::new(Holder {
            version: property(1),
        });

        let view = RootView::new(ViewConfig::default().with_bridge(SpyBridge(spy.clone())));
        let l = label.clone();
        view.show(&Div::containing(Display::of_obj(bind!(holder.version)).using(
            move |b, _| Paragraph::containing(Display::of(label_text(&l))).show(b),
        )))
        .unwrap();

        holder.version.set(2);
        assert_eq!(*spy.log.borrow(), ["install", "uninstall", "install"]);
        assert_eq!(spy.live.borrow().len(), 1);
    }

    #[test]
    fn test_dropping_the_view_uninstalls_everything() {
        let m = person("a");
        let r = roster(vec![m.clone()]);
        let view = RootView::default();
        view.show(&Div::containing((
            Paragraph::containing(Display::of(bind!(m.name))),
            Display::of_seq(bind!(r.people)).using(name_item),
        )))
        .unwrap();
        assert_eq!(m.name.subscriber_count(), 2);
        assert_eq!(r.people.subscriber_count(), 1);
        assert_eq!(view.tree().binding_count(), 3);

        drop(view);
        assert_eq!(m.name.subscriber_count(), 0);
        assert_eq!(r.people.subscriber_count(), 0);
        m.name.set("gone".to_string());
    }

    #[test]
    fn test_when_empty_substitute() {
        let m = person("");
        let view = RootView::default();
        view.show(&Paragraph::containing(
            Display::of(bind!(m.name)).when_empty_ws("(none)", Ws(5)),
        ))
        .unwrap();

        let para = first_child(&view);
        {
            let tree = view.tree();
            assert_eq!(tree.para_text(para), "(none)");
            assert_eq!(tree.runs(para)[0].style.ws(), Ws(5));
        }

        m.name.set("x".to_string());
        assert_eq!(view.tree().para_text(para), "x");
        m.name.set(String::new());
        assert_eq!(view.tree().para_text(para), "(none)");
    }

    #[test]
    fn test_styled_and_multilingual_text() {
        struct Note {
            body: Property<StyledText>,
            gloss: Property<MultiString>,
        }
        let note = Rc::new(Note {
            body: property(
                StyledText::new()
                    .with("bold", [StyleProp::FontWeight(FW_BOLD)])
                    .with(" plain", []),
            ),
            gloss: property(MultiString::new().with(Ws(1), "cat").with(Ws(2), "chat")),
        });

        let view = RootView::default();
        view.show(&Div::containing((
            Paragraph::containing(Display::of(bind!(note.body))),
            Paragraph::containing(Display::of(bind!(note.gloss)).ws(Ws(2))),
        )))
        .unwrap();

        let div = first_child(&view);
        let (body, gloss) = {
            let tree = view.tree();
            let kids = tree.children(div);
            let (body, gloss) = (kids[0], kids[1]);
            let runs = tree.runs(body);
            assert_eq!(runs.len(), 2);
            assert!(runs[0].style.is_bold());
            assert!(!runs[1].style.is_bold());
            assert_eq!(tree.para_text(gloss), "chat");
            assert_eq!(tree.runs(gloss)[0].style.ws(), Ws(2));
            (body, gloss)
        };

        note.body.set(StyledText::new());
        note.gloss.update(|g| g.set(Ws(2), "chatte"));

        let tree = view.tree();
        assert_eq!(tree.runs(body).len(), 1);
        assert_eq!(tree.para_text(body), "");
        assert_eq!(tree.para_text(gloss), "chatte");
    }

    #[test]
    fn test_object_binding_follows_the_object() {
        struct Slot {
            who: Property<Option<Rc<Person>>>,
        }
        let slot = Rc::new(Slot {
            who: property(None),
        });
        let view = RootView::default();
        view.show(&Div::containing(Display::of_obj(bind!(slot.who)).using(
            |b, who| match who {
                Some(p) => Paragraph::containing(Display::of(bind!(p.name))).show(b),
                None => Paragraph::containing(Display::of("nobody")).show(b),
            },
        )))
        .unwrap();

        let div = first_child(&view);
        assert_eq!(texts(&view.tree(), div), ["nobody"]);

        let ann = person("ann");
        slot.who.set(Some(ann.clone()));
        assert_eq!(texts(&view.tree(), div), ["ann"]);

        ann.name.set("Ann".to_string());
        assert_eq!(texts(&view.tree(), div), ["Ann"]);

        slot.who.set(None);
        assert_eq!(texts(&view.tree(), div), ["nobody"]);
        assert_eq!(ann.name.subscriber_count(), 0);
    }

    #[test]
    fn test_broadcast_bridge_drives_plain_fields() {
        let broadcast = PropBroadcast::new();
        let label = Rc::new(Label {
            text: RefCell::new("10".to_string()),
        });
        let view = RootView::new(
            ViewConfig::default().with_bridge(BroadcastBridge::new(broadcast.clone())),
        );
        view.show(&Paragraph::containing(Display::of(label_text(&label))))
            .unwrap();
        assert_eq!(broadcast.listener_count(), 1);

        *label.text.borrow_mut() = "20".to_string();
        broadcast.prop_changed(&label, "text");
        assert_eq!(view.tree().para_text(first_child(&view)), "20");

        drop(view);
        assert_eq!(broadcast.listener_count(), 0);
    }

    #[test]
    fn test_plain_field_without_bridge_is_static() {
        let label = Rc::new(Label {
            text: RefCell::new("fixed".to_string()),
        });
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of(label_text(&label))))
            .unwrap();

        let tree = view.tree();
        assert_eq!(tree.para_text(tree.children(tree.root_box())[0]), "fixed");
        assert_eq!(tree.binding_count(), 0);
    }

    #[test]
    fn test_malformed_expression_fails_fast() {
        let label = Rc::new(Label {
            text: RefCell::new(String::new()),
        });
        let bad = MemberExpr::field(&label, "text()", |l| l.text.borrow().clone());
        let view = RootView::default();
        let err = view
            .show(&Paragraph::containing(Display::of(bad)))
            .unwrap_err();
        assert!(matches!(err, ViewError::Bind(_)));
    }

    #[test]
    fn test_box_inside_paragraph_is_rejected() {
        let view = RootView::default();
        let err = view
            .show(&Paragraph::containing(Div::containing(Display::of("x"))))
            .unwrap_err();
        assert!(matches!(err, ViewError::BoxInParagraph(_)));
    }

    #[test]
    fn test_selection_failures() {
        let m = person("Hello");
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of(bind!(m.name))))
            .unwrap();
        view.show(&Paragraph::containing(Display::of("literal")))
            .unwrap();

        let no_offset = SelectionBuilder::in_root(&view).child(0).selection();
        assert!(matches!(
            no_offset,
            Err(ViewError::SelectionNotImplemented(_))
        ));

        let missing = SelectionBuilder::in_root(&view)
            .child(7)
            .offset(0)
            .selection();
        assert!(matches!(missing, Err(ViewError::SelectionUnresolved(_))));

        let past_end = SelectionBuilder::in_root(&view)
            .child(0)
            .offset(9)
            .selection();
        assert!(matches!(
            past_end,
            Err(ViewError::OffsetOutOfRange { offset: 9, len: 5 })
        ));

        let in_literal = SelectionBuilder::in_root(&view)
            .child(1)
            .offset(1)
            .selection()
            .unwrap();
        let Selection::Insertion(ip) = in_literal else {
            panic!("expected an insertion point, got {in_literal:?}");
        };
        let tree = view.tree();
        assert_eq!(tree.hookup_text(ip.hookup).as_deref(), Some("literal"));
        assert_eq!(ip.offset, 1);
    }

    #[test]
    fn test_selection_in_literal_leaf() {
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of("Hello")))
            .unwrap();

        let sel = SelectionBuilder::in_root(&view)
            .child(0)
            .offset(3)
            .selection()
            .unwrap();

        let tree = view.tree();
        let leaf = find_hookup(&tree, |k| matches!(k, HookupKind::Text(_)));
        assert_eq!(tree.hookups().get(leaf).map(|n| n.kind().name()), Some("literal"));
        assert!(!tree.hookups().get(leaf).unwrap().is_live());
        let ip = InsertionPoint {
            hookup: leaf,
            offset: 3,
        };
        assert_eq!(sel, Selection::Insertion(ip));

        let para = tree.children(tree.root_box())[0];
        assert_eq!(ip.locate(&tree), Some((para, 0, 3)));
    }

    #[test]
    fn test_failed_item_leaves_the_sequence_consistent() {
        let (a, bad, c) = (person("a"), person("bad"), person("c"));
        let r = roster(vec![a.clone()]);
        let strict = Rc::new(Cell::new(true));
        let picky = {
            let strict = strict.clone();
            move |b: &mut ViewBuilder<'_>, p: &Rc<Person>| {
                if strict.get() && p.name.get() == "bad" {
                    return Paragraph::containing(Div::containing(Display::of("x"))).show(b);
                }
                name_item(b, p)
            }
        };
        let view = RootView::default();
        view.show(&Div::containing(Display::of_seq(bind!(r.people)).using(picky)))
            .unwrap();
        let div = first_child(&view);
        let seq = find_hookup(&view.tree(), |k| matches!(k, HookupKind::Sequence(_)));

        r.people.set(vec![a.clone(), bad.clone()]);
        {
            let tree = view.tree();
            assert_eq!(texts(&tree, div), ["a"]);
            assert_eq!(tree.item_count(seq), 1);
        }

        strict.set(false);
        r.people.set(vec![a, bad, c]);
        let tree = view.tree();
        assert_eq!(texts(&tree, div), ["a", "bad", "c"]);
        assert_eq!(tree.item_count(seq), 3);
    }

    #[test]
    fn test_failed_object_rebuild_is_retried() {
        struct Slot {
            who: Property<Rc<Person>>,
        }
        let strict = Rc::new(Cell::new(true));
        let slot = Rc::new(Slot {
            who: property(person("ann")),
        });
        let template = {
            let strict = strict.clone();
            move |b: &mut ViewBuilder<'_>, p: &Rc<Person>| {
                if strict.get() && p.name.get() == "bad" {
                    return Paragraph::containing(Div::containing(Display::of("x"))).show(b);
                }
                name_item(b, p)
            }
        };
        let view = RootView::default();
        view.show(&Div::containing(Display::of_obj(bind!(slot.who)).using(template)))
            .unwrap();
        let div = first_child(&view);

        let bad = person("bad");
        slot.who.set(bad.clone());
        assert!(texts(&view.tree(), div).is_empty());
        assert_eq!(bad.name.subscriber_count(), 0);

        strict.set(false);
        slot.who.notify();
        assert_eq!(texts(&view.tree(), div), ["bad"]);
        assert_eq!(bad.name.subscriber_count(), 1);
    }

    #[test]
    fn test_failed_show_leaves_the_root_untouched() {
        let m = person("kept");
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of("before")))
            .unwrap();
        let (hookups, boxes) = {
            let tree = view.tree();
            (tree.hookups().len(), tree.boxes().len())
        };

        let err = view
            .show(&Div::containing((
                Paragraph::containing(Display::of(bind!(m.name))),
                Paragraph::containing(Div::containing(Display::of("x"))),
            )))
            .unwrap_err();
        assert!(matches!(err, ViewError::BoxInParagraph(_)));
        assert_eq!(m.name.subscriber_count(), 0);
        {
            let tree = view.tree();
            assert_eq!(texts(&tree, tree.root_box()), ["before"]);
            assert_eq!(tree.hookups().len(), hookups);
            assert_eq!(tree.boxes().len(), boxes);
            assert_eq!(tree.binding_count(), 0);
        }

        view.show(&Paragraph::containing(Display::of("after")))
            .unwrap();
        let tree = view.tree();
        assert_eq!(texts(&tree, tree.root_box()), ["before", "after"]);
    }

    #[test]
    fn test_range_selection_and_teardown() {
        let (a, b) = (person("alpha"), person("beta"));
        let r = roster(vec![a, b]);
        let view = RootView::default();
        view.show(&Div::containing(
            Display::of_seq(bind!(r.people)).using(name_item),
        ))
        .unwrap();

        // root > div > flow group > sequence > items
        let sel = SelectionBuilder::in_root(&view)
            .child(0)
            .child(0)
            .child(0)
            .offset(1)
            .to()
            .child(0)
            .child(0)
            .child(0)
            .child(1)
            .offset(2)
            .install()
            .unwrap();

        let Selection::Range(range) = sel else {
            panic!("expected a range, got {sel:?}");
        };
        {
            let tree = view.tree();
            assert_eq!(tree.hookup_text(range.anchor.hookup).as_deref(), Some("alpha"));
            assert_eq!(tree.hookup_text(range.end.hookup).as_deref(), Some("beta"));
        }
        assert_eq!(range.anchor.offset, 1);
        assert_eq!(range.end.offset, 2);
        assert_eq!(view.selection(), Some(sel));

        r.people.update(|v| {
            v.pop();
        });
        assert_eq!(view.selection(), None);
    }

    #[test]
    fn test_sibling_styles_are_shared() {
        let view = RootView::default();
        view.show(&Div::containing((
            Paragraph::containing(Display::of("a")).bold(),
            Paragraph::containing(Display::of("b")).bold(),
            Paragraph::containing(Display::of("c")),
        )))
        .unwrap();

        let tree = view.tree();
        let div = tree.children(tree.root_box())[0];
        let styles: Vec<_> = tree
            .children(div)
            .iter()
            .map(|p| tree.boxes().get(*p).unwrap().style().clone())
            .collect();
        assert!(Rc::ptr_eq(&styles[0], &styles[1]));
        assert!(styles[0].is_bold());
        assert!(!styles[2].is_bold());
        assert!(!tree.root_style().unwrap().is_bold());
    }

    #[test]
    fn test_flow_shown_twice_is_independent() {
        let m = person("x");
        let flow = Paragraph::containing(Display::of(bind!(m.name)));
        let view = RootView::default();
        view.show(&flow).unwrap();
        view.show(&flow).unwrap();
        assert_eq!(view.tree().binding_count(), 2);

        m.name.set("y".to_string());
        let tree = view.tree();
        assert_eq!(texts(&tree, tree.root_box()), ["y", "y"]);
    }

    #[test]
    fn test_snapshot_serializes_box_tree() {
        let view = RootView::default();
        view.show(
            &Row::with_widths([Units::points(72.0), Units::points(36.0)]).containing((
                crate::Cell::containing(Display::of("a")),
                crate::Cell::containing(Display::of("b")),
            )),
        )
        .unwrap();

        let json = serde_json::to_value(view.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "root",
                "children": [{
                    "kind": "row",
                    "widths": [72000, 36000],
                    "children": [
                        { "kind": "cell", "children": [{ "kind": "para", "runs": ["a"] }] },
                        { "kind": "cell", "children": [{ "kind": "para", "runs": ["b"] }] }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_reentrant_notification_is_dropped() {
        let m = person("a");
        let view = RootView::default();
        view.show(&Paragraph::containing(Display::of(bind!(m.name))))
            .unwrap();

        {
            let _held = view.tree();
            m.name.set("b".to_string());
        }
        let tree = view.tree();
        assert_eq!(tree.para_text(tree.children(tree.root_box())[0]), "a");
        assert_eq!(tree.rebuild_count(), 0);
    }
}
