// Paradigm compilation and lexicon loading on small inline grammars.

use latin_parser_lib::paradigm::StemRule;
use latin_parser_lib::{analyze, lemmatize, Builder, Defect, Error, Options, Origin, Registry};

const MORPHOS: &str = "\
1:nominative singular
2:vocative singular
3:accusative singular
4:genitive singular
5:dative singular
6:ablative singular
7:nominative plural
8:vocative plural
9:accusative plural
10:genitive plural
11:dative plural
12:ablative plural
";

const PARENT: &str = "\
$lupus=us;e;um;ī;ō;ō;ī;ī;ōs;ōrum;īs;īs
modele:lupus
R:1:2
des:1-12:1:$lupus
pos:n
";

fn builder() -> Builder {
    let mut b = Builder::new();
    b.morphos(MORPHOS).paradigms(PARENT);
    b
}

fn build(paradigms: &str) -> Registry {
    let mut b = builder();
    b.paradigms(paradigms);
    b.finish()
}

/// (morpho, slot, accented) of every ending of a paradigm, in table order.
fn table(r: &Registry, name: &str) -> Vec<(u16, u8, String)> {
    let p = r.paradigm(name).unwrap();
    p.all_endings()
        .map(|id| {
            let e = r.ending(id);
            (e.morpho(), e.slot(), e.accented().to_string())
        })
        .collect()
}

fn accented(r: &Registry, name: &str, morpho: u16) -> Vec<String> {
    let p = r.paradigm(name).unwrap();
    p.endings(morpho)
        .iter()
        .map(|id| r.ending(*id).accented().to_string())
        .collect()
}

#[test]
fn child_inherits_everything_not_overridden_or_absent() {
    let r = build("modele:child\npere:lupus\nabs:1-2\ndes:3:1:em\n");
    let parent = table(&r, "lupus");
    let child = table(&r, "child");

    for (morpho, slot, spelling) in &parent {
        match morpho {
            1 | 2 => assert!(!child.iter().any(|(m, _, _)| m == morpho)),
            3 => assert_eq!(accented(&r, "child", 3), vec!["em"]),
            _ => assert!(
                child.contains(&(*morpho, *slot, spelling.clone())),
                "code {morpho} not inherited"
            ),
        }
    }
    let p = r.paradigm("child").unwrap();
    assert!(p.is_absent(1) && p.is_absent(2));
    assert_eq!(p.pos(), Some("n"));
    assert_eq!(p.stem_rule(1), Some(&StemRule::Cut { remove: 2, append: String::new() }));
    assert!(p.is_a("lupus", &r));
    assert!(r.defects().is_empty(), "{:?}", r.defects());
}

#[test]
fn inherited_endings_belong_to_the_child() {
    let r = build("modele:child\npere:lupus\n");
    let child = r.paradigm("child").unwrap();
    for id in child.all_endings() {
        assert_eq!(r.ending(id).paradigm(), child.id());
    }
    assert_eq!(table(&r, "child").len(), table(&r, "lupus").len());
}

#[test]
fn additive_endings_come_before_the_parents() {
    let r = build("modele:child\npere:lupus\ndes+:4:1:ae\n");
    assert_eq!(accented(&r, "child", 4), vec!["ae", "ī"]);
    assert_eq!(accented(&r, "child", 5), vec!["ō"]);
}

#[test]
fn replacing_endings_drop_the_parents() {
    let r = build("modele:child\npere:lupus\ndes:4:1:ae\n");
    assert_eq!(accented(&r, "child", 4), vec!["ae"]);
}

#[test]
fn last_cell_repeats_and_alternatives_split() {
    let r = build("modele:short\nR:1:1\ndes:1-4:1:a,ă2;e\n");
    assert_eq!(accented(&r, "short", 1), vec!["a", "ă"]);
    assert_eq!(accented(&r, "short", 2), vec!["e"]);
    assert_eq!(accented(&r, "short", 4), vec!["e"]);

    let rare = r.paradigm("short").unwrap().endings(1)[1];
    assert_eq!(r.ending(rare).rarity(), 2);
}

#[test]
fn absent_sets_replace_extend_or_inherit() {
    let r = build(
        "modele:base\npere:lupus\nabs:1\n\
         modele:inherits\npere:base\n\
         modele:extends\npere:base\nabs+:2\n\
         modele:replaces\npere:base\nabs:3\n",
    );
    let absent = |name: &str| -> Vec<u16> {
        r.paradigm(name).unwrap().absent().iter().copied().collect()
    };
    assert_eq!(absent("inherits"), vec![1]);
    assert_eq!(absent("extends"), vec![1, 2]);
    assert_eq!(absent("replaces"), vec![3]);
}

#[test]
fn suffix_class_doubles_listed_codes() {
    let r = build("modele:que\npere:lupus\nsuf:1-2:que\n");
    assert_eq!(accented(&r, "que", 1), vec!["us", "usque"]);
    assert_eq!(accented(&r, "que", 2), vec!["e", "eque"]);
    assert_eq!(accented(&r, "que", 3), vec!["um"]);
    assert!(!r.endings_for("usque").is_empty());
}

#[test]
fn parent_suffix_replaces_all_endings() {
    let r = build("modele:met\npere:lupus\nabs:12\nsufd:met\n");
    assert_eq!(accented(&r, "met", 1), vec!["usmet"]);
    assert_eq!(accented(&r, "met", 10), vec!["ōrummet"]);
    assert!(accented(&r, "met", 12).is_empty());
}

#[test]
fn unknown_parent_is_an_error() {
    let mut b = builder();
    let err = b.compile_paradigm(&["modele:orphan", "pere:nosuch"]).unwrap_err();
    assert!(matches!(err, Error::UnknownParadigm(ref name) if name == "nosuch"));

    b.paradigms("modele:orphan\npere:nosuch\n");
    let r = b.finish();
    assert!(r.paradigm("orphan").is_err());
    assert!(r
        .defects()
        .iter()
        .any(|d| matches!(d, Defect::SkippedParadigm { paradigm, .. } if paradigm == "orphan")));
}

#[test]
fn self_parent_is_cyclic() {
    let mut b = builder();
    let err = b.compile_paradigm(&["modele:loop", "pere:loop"]).unwrap_err();
    assert!(matches!(err, Error::CyclicParadigm(_)));
}

#[test]
fn missing_stem_rule_is_reported() {
    let r = build("modele:child\npere:lupus\ndes:13:3:x\n");
    assert!(r.defects().contains(&Defect::MissingStemRule {
        paradigm: "child".to_string(),
        slot: 3,
    }));
    assert!(r.paradigm("child").is_ok());
}

#[test]
fn bad_directives_are_skipped_with_defects() {
    let r = build("modele:odd\npere:lupus\nfoo:1\ndes:1:1:$nosuch\nR:x:2\n");
    let defects = r.defects();
    assert!(defects
        .iter()
        .any(|d| matches!(d, Defect::UnknownDirective { directive, .. } if directive == "foo")));
    assert!(defects
        .iter()
        .any(|d| matches!(d, Defect::UnknownVariable { variable, .. } if variable == "$nosuch")));
    assert!(defects
        .iter()
        .any(|d| matches!(d, Defect::MalformedDirective { line, .. } if line == "R:x:2")));
    assert_eq!(accented(&r, "odd", 1), vec!["us"]);
}

#[test]
fn stem_rules_generate_stems() {
    let mut b = builder();
    b.paradigms("modele:skip\npere:lupus\nR:2:-\nR:3:K\ndes:13:3:-\n");
    let lupus = b.add_lemma("lŭpus|lupus|||i, m.|5", Origin::Core).unwrap();
    let skip = b.add_lemma("alter|skip|||i, m.|1", Origin::Core).unwrap();
    let r = b.finish();

    let lemma = r.lemma_by_id(lupus);
    let stems: Vec<&str> = lemma.stems(1).iter().map(|id| r.stem(*id).bare()).collect();
    assert_eq!(stems, vec!["lup"]);

    let lemma = r.lemma_by_id(skip);
    assert!(lemma.stems(2).is_empty());
    let canonical: Vec<&str> = lemma.stems(3).iter().map(|id| r.stem(*id).bare()).collect();
    assert_eq!(canonical, vec!["alter"]);
}

#[test]
fn explicit_stems_replace_generated_ones() {
    let mut b = builder();
    let id = b
        .add_lemma("bos|lupus|bŏv,bŭ||bovis, m.|7", Origin::Core)
        .unwrap();
    let r = b.finish();
    let lemma = r.lemma_by_id(id);
    let stems: Vec<&str> = lemma.stems(1).iter().map(|id| r.stem(*id).bare()).collect();
    assert_eq!(stems, vec!["bov", "bu"]);
    assert!(!r.stems_for("bou").is_empty());
}

#[test]
fn duplicate_lemma_adds_frequency() {
    let mut b = builder();
    let first = b.add_lemma("lŭpus|lupus|||i, m.|5", Origin::Core).unwrap();
    let second = b.add_lemma("lupus|lupus|||i, m.|7", Origin::Extension).unwrap();
    assert_eq!(first, second);
    let r = b.finish();
    assert_eq!(r.lemma("lupus").unwrap().frequency(), 12);
    assert_eq!(r.lemma("lupus").unwrap().origin(), Origin::Core);
    assert_eq!(r.lemmas().count(), 1);
}

#[test]
fn short_lexicon_line_is_accepted_but_flagged() {
    let mut b = builder();
    let id = b.add_lemma("uir|lupus", Origin::Core);
    assert!(id.is_some());
    let r = b.finish();
    assert!(r
        .defects()
        .iter()
        .any(|d| matches!(d, Defect::MalformedLexiconLine { .. })));
    assert_eq!(r.lemma("uir").unwrap().frequency(), 1);
}

#[test]
fn unknown_paradigm_in_lexicon_is_skipped() {
    let mut b = builder();
    assert!(b.add_lemma("uir|nosuch|||i, m.|1", Origin::Core).is_none());
    let r = b.finish();
    assert!(r.lemma("uir").is_err());
}

#[test]
fn irregular_for_unknown_lemma_is_skipped() {
    let mut b = builder();
    assert!(b.add_irregular("dī*:deus:7-8").is_none());
    assert!(b
        .registry()
        .defects()
        .iter()
        .any(|d| matches!(d, Defect::UnknownLemmaReference { lemma, .. } if lemma == "deus")));
}

#[test]
fn possible_forms_cover_the_paradigm() {
    let mut b = builder();
    b.add_lemma("lŭpus|lupus|||i, m.|5", Origin::Core);
    let r = b.finish();
    let forms = r.lemma("lupus").unwrap().possible_forms(&r);
    assert_eq!(
        forms,
        vec!["lupe", "lupi", "lupis", "lupo", "luporum", "lupos", "lupum", "lupus"]
    );
}

#[test]
fn inline_grammar_analyses_words() {
    let mut b = builder();
    b.add_lemma("lŭpus|lupus|||i, m.|5", Origin::Core);
    let r = b.finish();
    let codes: Vec<u16> = analyze("luporum", &r).iter().map(|a| a.morpho).collect();
    assert_eq!(codes, vec![10]);
    let results = analyze("lupos", &r);
    assert_eq!(results[0].accented, "lŭpōs");
    assert_eq!(results[0].description, "accusative plural");
}

#[test]
fn cycle_through_an_ancestor_is_rejected() {
    let r = build("modele:a\npere:lupus\nmodele:b\npere:a\nmodele:a\npere:b\n");
    assert!(r.defects().iter().any(|d| matches!(
        d,
        Defect::SkippedParadigm { paradigm, reason }
            if paradigm == "a" && reason.contains("inherits from itself")
    )));
    let a = r.paradigm("a").unwrap();
    assert_eq!(a.parent(), r.paradigm_id("lupus"));
    assert!(!r
        .defects()
        .iter()
        .any(|d| matches!(d, Defect::DuplicateParadigm(_))));
}

#[test]
fn second_parent_directive_is_reported() {
    let r = build("modele:two\npere:lupus\npere:uita\n");
    assert!(r.defects().contains(&Defect::MalformedDirective {
        paradigm: "two".to_string(),
        line: "pere:uita".to_string(),
    }));
    let two = r.paradigm("two").unwrap();
    assert!(two.is_a("lupus", &r));
    assert_eq!(accented(&r, "two", 1), vec!["us"]);
}

#[test]
fn redefined_paradigm_is_reported() {
    let r = build("modele:lupus\nR:1:1\ndes:1:1:a\n");
    assert!(r.defects().contains(&Defect::DuplicateParadigm("lupus".to_string())));
    assert_eq!(accented(&r, "lupus", 1), vec!["a"]);
}

#[test]
fn directive_before_any_paradigm_is_reported() {
    let r = build("R:1:2\nmodele:late\nR:1:1\n");
    assert!(r
        .defects()
        .contains(&Defect::OrphanDirective("R:1:2".to_string())));
    assert!(r.paradigm("late").is_ok());
}

#[test]
fn malformed_irregular_is_reported() {
    let mut b = builder();
    b.add_lemma("lŭpus|lupus|||i, m.|5", Origin::Core);
    b.irregulars("lupe:lupus\nlupōrum*:lupus:10\n");
    let r = b.finish();
    assert!(r
        .defects()
        .contains(&Defect::MalformedIrregular("lupe:lupus".to_string())));
    assert!(r.lemma("lupus").unwrap().is_suppressed(10));
}

#[test]
fn gender_follows_cross_reference() {
    let mut b = builder();
    b.add_lemma("lŭpus|lupus|||i, m.|5", Origin::Core);
    b.add_lemma("lupa2|lupus|||cf. lupus|1", Origin::Core);
    b.add_lemma("uulpes|lupus|||cf. nosuch|1", Origin::Core);
    let r = b.finish();

    let pointer = r.lemma("lupa2").unwrap();
    assert_eq!(pointer.cross_reference(), Some("lupus"));
    assert_eq!(pointer.gender(&r), "m");
    assert_eq!(pointer.pos(&r), "n");

    let dangling = r.lemma("uulpes").unwrap();
    assert_eq!(dangling.gender(&r), "");
}

#[test]
fn numeral_reading_does_not_hide_extension_words() {
    let mut b = Builder::with_options(Options { core_only: true });
    b.morphos(MORPHOS)
        .paradigms(PARENT)
        .paradigms("modele:inv\nR:0:0,0\ndes:13:0:-\npos:d\n");
    b.add_lemma("dix|inv|||adv.|1", Origin::Extension);
    let r = b.finish();

    let result = lemmatize("dix", &r);
    assert!(result
        .analyses
        .iter()
        .any(|a| a.lemma_key == "dix" && a.origin == Origin::Extension));
    let numeral = result.analyses.last().unwrap();
    assert_eq!(numeral.lemma_key, "DIX");
    assert_eq!(numeral.pos, "m");
}
