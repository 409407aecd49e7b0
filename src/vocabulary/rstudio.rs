//! RStudio vocabulary
//!
//! RStudio's vim mode stays in insert mode between utterances, so runs have no
//! exit keys and most normal-mode commands escape first.

use super::vim::{camel_case_motions, easymotion, ex_commands, letter_motions, text_objects, word_motions};
use super::{keys, text, ActionSpec, CountSlot, SelfApplication, VariantOptions, VocabularyBuilder};
use crate::register::LETTERS;

fn escaped(then: ActionSpec) -> ActionSpec {
    keys("escape, escape").then(then)
}

pub fn builder(options: &VariantOptions) -> VocabularyBuilder {
    let builder = VocabularyBuilder::new("rstudio")
        .letters(LETTERS)
        .chaos_operator("chaos")
        .insert_mode("inns", keys("i"))
        .insert_mode("syn", keys("a"))
        .insert_mode("phyllo", keys("escape, escape, o"))
        .insert_mode("phylum", keys("escape, escape, O"));

    let builder = key_insertions(builder);
    let builder = arithmetic(builder);

    let builder = builder
        .motion("upward", text("k"))
        .motion("downward", text("j"))
        .motion("leftward", text("h"))
        .motion("rightward", text("l"))
        .motion("apla", escaped(text("{")))
        .motion("anla", escaped(text("}")))
        .motion("sapla", escaped(text("(")))
        .motion("sanla", escaped(text(")")))
        .motion("karen", text("^"))
        .motion("keratin", text("0"))
        .motion("doll", text("$"))
        .motion("ender", keys("end"))
        .motion("homer", keys("home"))
        .motion("screecare", escaped(text("g^")))
        .motion("screedoll", escaped(text("g$")))
        .motion("scree up", escaped(text("gk")))
        .motion("scree down", escaped(text("gj")))
        .motion("goron", keys("escape, escape, G"))
        .motion("page high", escaped(text("H")))
        .motion("page low", escaped(text("L")))
        .motion("warp", text("``"));

    let builder = word_motions(builder);
    let builder = camel_case_motions(builder);
    let builder = easymotion(builder, &options.easymotion_leader);
    let builder = text_objects(builder);
    let builder = letter_motions(builder);

    let builder = builder
        .uncounted_motion("tect", text("%"))
        .uncounted_motion("matu", text("M"))
        .operator("relo", "", SelfApplication::Doubled)
        .operator("chaos", "c", SelfApplication::Doubled)
        .operator("swap case", "g~", SelfApplication::Doubled)
        .operator("capital", "gU", SelfApplication::Doubled)
        .operator("lowery", "gu", SelfApplication::Doubled)
        .operator("external filter", "!", SelfApplication::Doubled)
        .operator("external format", "=", SelfApplication::Doubled)
        .operator("format text", "gq", SelfApplication::Doubled)
        .operator("rotate thirteen", "g?", SelfApplication::Doubled)
        .operator("define fold", "zf", SelfApplication::Doubled)
        .operator("comm nop", "gc", SelfApplication::LineComment)
        .command("flax", keys("X"))
        .command("switch", keys("escape, escape, s"))
        .command("undo", keys("u"))
        .command("redo", keys("c-r"))
        .command("pesto", keys("escape, escape, P"))
        .command("post", keys("escape, escape, p"))
        .command("ditto", text("."))
        .macro_command("ripple")
        .command("visual", keys("escape, escape, v"))
        .command("visual line", keys("escape, escape, s-v"))
        .command("visual block", keys("escape, escape, c-v"))
        .command("dell", keys("escape, escape, d, d"))
        .command("yank", keys("escape, escape, y, y"))
        .command("deli", keys("d"))
        .command("yoink", keys("y"))
        .command("dello", keys("escape, escape, d, i, w"))
        .command("cello", keys("escape, escape, c, i, w"))
        .command("capsicum", keys("escape, escape, v, b, U, e, a"))
        .style("proper")
        .style("camel")
        .style("(rel-path | rel path)")
        .style("(abs-path | abs path)")
        .style("eelword")
        .style("sentence")
        .style("uppercase")
        .style("lowercase")
        .style("(scope-resolve | scope resolve)")
        .style("jumble")
        .style("dotword")
        .style("dashword")
        .style("natword")
        .style("snakeword")
        .style("(brooding-narrative | brooding narrative)")
        .style("(string-sequence | string sequence)")
        .style("(superstring-sequence | superstring sequence)")
        .style("(comma-sequence | comma sequence)")
        .style("acronym");

    ex_commands(builder)
}

fn key_insertions(builder: VocabularyBuilder) -> VocabularyBuilder {
    let counted = [
        ("ace", "space"),
        ("tab", "tab"),
        ("slap", "enter"),
        ("chuck", "del"),
        ("scratch", "backspace"),
        ("nix", "x"),
        ("scroll up", "c-y"),
        ("scroll down", "c-e"),
        ("sundew", "c-z/25"),
        ("sundry", "cs-z"),
        ("tasman right", "c-tab/25"),
        ("tasman left", "cs-tab/25"),
        ("up", "up"),
        ("down", "down"),
        ("left", "left"),
        ("right", "right"),
        ("run on", "c-enter"),
    ];
    let plain = [
        ("ack", "escape"),
        ("bubble", "lparen, rparen, left"),
        ("box", "lbracket, rbracket, left"),
        ("mandolin", "lbrace, rbrace, left"),
        ("substring", "squote, squote, left"),
        ("superstring", "dquote/25:2, left"),
        ("sprint", "ctrl:down"),
        ("halt", "ctrl:up"),
        ("highlight", "shift:down"),
        ("stoplight", "shift:up"),
        ("highlighter", "ctrl:down, shift:down"),
        ("stoplighter", "ctrl:up, shift:up"),
        ("copy", "c-c"),
        ("cutout", "c-x"),
        ("pastry", "c-v"),
        ("savory", "c-s"),
        ("close tab", "c-w"),
        ("deloris", "c-d"),
        ("console pane", "c-2"),
        ("script pane", "c-1"),
        ("console clear", "c-l"),
        ("shortcuts", "as-k"),
        ("restarter", "cs-f10"),
        ("help file", "f1"),
        ("function def", "f2"),
        ("collapse all", "a-o"),
        ("expand all", "as-o"),
        ("collapse one", "a-l"),
        ("expand one", "as-l"),
        ("source from beginning", "ca-b"),
        ("source to end", "ca-e"),
        ("comment lines", "cs-c"),
        ("pipet", "space, percent, rangle, percent, enter"),
        ("run stay", "a-enter"),
        ("last line", "c-end"),
        ("first line", "c-home"),
        ("commando", "cs-c"),
    ];

    let builder = counted.iter().fold(builder, |builder, (spoken, key)| {
        builder.key_insertion(
            spoken,
            keys(&format!("{}:%(count)d", key)),
            CountSlot::Optional,
        )
    });
    let builder = plain.iter().fold(builder, |builder, (spoken, spec)| {
        builder.key_insertion(spoken, keys(spec), CountSlot::None)
    });

    builder.key_insertion(
        "goose",
        keys("escape").then(text("{count}G")),
        CountSlot::Required,
    )
}

fn arithmetic(builder: VocabularyBuilder) -> VocabularyBuilder {
    let texts = [
        ("assign", " = "),
        ("assigner", " <- "),
        ("equals", "="),
        ("compare eek", " == "),
        ("compare not eek", " != "),
        ("compare greater", " > "),
        ("compare less", " < "),
        ("compare geck", " >= "),
        ("compare lack", " <= "),
        ("bit ore", " | "),
        ("bit and", " & "),
        ("bit ex or", " ^ "),
        ("powder", "^"),
        ("operate multiply", " * "),
        ("operate divide", " / "),
        ("operate plus", " + "),
        ("operate minus", " - "),
        ("plus equal", " += "),
        ("minus equal", " -= "),
        ("times equal", " *= "),
        ("divided equal", " /= "),
        ("mod equal", " %= "),
        ("zero", "0"),
        ("num one", "1"),
        ("num two", "2"),
        ("num three", "3"),
        ("num four", "4"),
        ("num five", "5"),
        ("num six", "6"),
        ("num seven", "7"),
        ("num eight", "8"),
        ("num nine", "9"),
        ("nine", "9"),
        ("ten", "10"),
        ("eleven", "11"),
        ("twelve", "12"),
        ("thirteen", "13"),
        ("fourteen", "14"),
        ("fifteen", "15"),
        ("sixteen", "16"),
        ("seventeen", "17"),
        ("eighteen", "18"),
        ("nineteen", "19"),
        ("twenty", "20"),
        ("backslash", "\\"),
        ("commerce", ", "),
        ("colony", ": "),
        ("comment", "# "),
        ("bang", "! "),
        ("banger", "!!"),
        ("phil", "fill"),
        ("ro", "row"),
        ("daytime", "datetime"),
        ("tibble", "tibble"),
        ("right hand side", "right"),
    ];
    let key_specs = [
        ("commadore", "right, comma, space"),
        ("onward", "right, space"),
        ("baubles", "space, percent, percent, left"),
        ("commune", "comma, enter"),
        ("colonial", "comma, enter"),
        ("vector", "c, lparen, rparen, left"),
        ("quadcommendo", "hash, hash, hash, hash, enter, enter"),
        (
            "function start",
            "space, equals, space, f, u, n, c, t, i, o, n, lparen, rparen, lbrace, left:2",
        ),
        (
            "function next",
            "escape, escape, o, enter, enter, r, e, t, u, r, n, lparen, rparen, enter, rbrace, up, up, up, end",
        ),
        (
            "for loop start",
            "f, o, r, lparen, i, space, i, n, space, rparen, lbrace, left:2",
        ),
        ("for loop next", "escape, escape, o, enter, rbrace, up, end"),
    ];

    let builder = texts
        .iter()
        .fold(builder, |builder, (spoken, t)| builder.arithmetic(spoken, text(t)));
    let builder = key_specs
        .iter()
        .fold(builder, |builder, (spoken, spec)| builder.arithmetic(spoken, keys(spec)));

    // Capitals: `chap <letter>`
    LETTERS.iter().fold(builder, |builder, (spoken, letter)| {
        builder.arithmetic(
            &format!("chap {}", spoken),
            text(&letter.to_ascii_uppercase().to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::vocabulary::{CommandEntry, Variant};

    #[test]
    fn test_builtin_rstudio_vocabulary_builds() {
        let vocab = Variant::Rstudio
            .builder(&VariantOptions::default())
            .build()
            .unwrap();
        assert_eq!(vocab.name(), "rstudio");
        assert!(vocab.run_exit().is_none());
        assert_eq!(vocab.command("ripple"), Some(&CommandEntry::Macro));
        assert_eq!(vocab.arithmetic("chap quebec"), Some(&Action::text("Q")));
        assert_eq!(vocab.arithmetic("mod equal"), Some(&Action::text(" %= ")));
        assert!(vocab.operator("capital").is_some());
        assert!(vocab.operator("uppercase").is_none());
        assert_eq!(vocab.style("string sequence"), Some("stringsequence"));
        assert!(vocab.ex_command("left").is_none());
    }

    #[test]
    fn test_goose_requires_a_count() {
        let vocab = builder(&VariantOptions::default()).build().unwrap();
        let goose = vocab.key_insertion("goose").unwrap();
        assert_eq!(goose.count, CountSlot::Required);
        assert_eq!(goose.action.bind_count(42).to_string(), "<escape>42G");

        let tasman = vocab.key_insertion("tasman left").unwrap();
        assert_eq!(tasman.action.bind_count(2).to_string(), "<cs-tab/25:2>");
    }
}
