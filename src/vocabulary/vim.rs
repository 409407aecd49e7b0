//! vim vocabulary
//!
//! Every spoken command starts and ends in normal mode: an insertion run is
//! entered through its mode entry and left again with a double escape.

use super::{keys, text, CountSlot, SelfApplication, VariantOptions, VocabularyBuilder};
use crate::register::LETTERS;

pub fn builder(options: &VariantOptions) -> VocabularyBuilder {
    let builder = VocabularyBuilder::new("vim")
        .letters(LETTERS)
        .chaos_operator("chaos")
        .run_exit(keys("escape:2"))
        // insert mode entries
        .insert_mode("inns", keys("i"))
        .insert_mode("syn", keys("a"))
        .insert_mode("phyllo", keys("o"))
        .insert_mode("phylum", keys("O"))
        // key insertions
        .key_insertion("ace", keys("space:%(count)d"), CountSlot::Optional)
        .key_insertion("tab", keys("tab:%(count)d"), CountSlot::Optional)
        .key_insertion("slap", keys("enter:%(count)d"), CountSlot::Optional)
        .key_insertion("chuck", keys("del:%(count)d"), CountSlot::Optional)
        .key_insertion("scratch", keys("backspace:%(count)d"), CountSlot::Optional)
        .key_insertion("ack", keys("escape"), CountSlot::None)
        // arithmetic
        .arithmetic("assign", text("= "))
        .arithmetic("compare eek", text("== "))
        .arithmetic("compare not eek", text("!= "))
        .arithmetic("compare greater", text("> "))
        .arithmetic("compare less", text("< "))
        .arithmetic("compare geck", text(">= "))
        .arithmetic("compare lack", text("<= "))
        .arithmetic("bit ore", text("| "))
        .arithmetic("bit and", text("& "))
        .arithmetic("bit ex or", text("^ "))
        .arithmetic("times", text("* "))
        .arithmetic("divided", text("/ "))
        .arithmetic("plus", text("+ "))
        .arithmetic("minus", text("- "))
        .arithmetic("plus equal", text("+= "))
        .arithmetic("minus equal", text("-= "))
        .arithmetic("times equal", text("*= "))
        .arithmetic("divided equal", text("/= "))
        .arithmetic("mod equal", text("%= "))
        // motions
        .motion("up", text("k"))
        .motion("down", text("j"))
        .motion("left", text("h"))
        .motion("right", text("l"))
        .motion("apla", text("{"))
        .motion("anla", text("}"))
        .motion("sapla", text("("))
        .motion("sanla", text(")"))
        .motion("care", text("^"))
        .motion("hard care", text("0"))
        .motion("doll", text("$"))
        .motion("screecare", text("g^"))
        .motion("screedoll", text("g$"))
        .motion("scree up", text("gk"))
        .motion("scree down", text("gj"))
        .motion("go", text("G"))
        .motion("page high", text("H"))
        .motion("page low", text("L"));

    let builder = word_motions(builder);
    let builder = camel_case_motions(builder);
    let builder = easymotion(builder, &options.easymotion_leader);
    let builder = text_objects(builder);
    let builder = letter_motions(builder);

    let builder = builder
        .uncounted_motion("tect", text("%"))
        .uncounted_motion("matu", text("M"))
        // operators
        .operator("relo", "", SelfApplication::Doubled)
        .operator("chaos", "c", SelfApplication::Doubled)
        .operator("swap case", "g~", SelfApplication::Doubled)
        .operator("uppercase", "gU", SelfApplication::Doubled)
        .operator("lowercase", "gu", SelfApplication::Doubled)
        .operator("external filter", "!", SelfApplication::Doubled)
        .operator("external format", "=", SelfApplication::Doubled)
        .operator("format text", "gq", SelfApplication::Doubled)
        .operator("rotate thirteen", "g?", SelfApplication::Doubled)
        .operator("define fold", "zf", SelfApplication::Doubled)
        .operator("comm nop", "gc", SelfApplication::LineComment)
        // commands
        .command("flax", keys("X"))
        .command("nix", keys("x"))
        .command("undo", keys("u"))
        .command("pesto", keys("P"))
        .command("post", keys("p"))
        .command("ditto", text("."))
        .macro_command("ripple")
        .command("visual", keys("v"))
        .command("visual line", keys("s-v"))
        .command("visual block", keys("c-v"))
        .command("dell", keys("d"))
        .command("yank", keys("y"))
        .command("dello", text("daw"))
        .command("cello", text("caw"))
        // identifier styles
        .style("proper")
        .style("camel")
        .style("(rel-path | rel path)")
        .style("(abs-path | abs path)")
        .style("score")
        .style("sentence")
        .style("(scope-resolve | scope resolve)")
        .style("jumble")
        .style("dotword")
        .style("dashword")
        .style("natword")
        .style("snakeword")
        .style("(brooding-narrative | brooding narrative)");

    ex_commands(builder)
        .ex_command("up", keys("up"))
        .ex_command("down", keys("down"))
        .ex_counted("left", keys("left:%(count)d"))
        .ex_counted("right", keys("right:%(count)d"))
}

pub(super) fn word_motions(builder: VocabularyBuilder) -> VocabularyBuilder {
    builder
        .motion("lope", text("b"))
        .motion("yope", text("w"))
        .motion("elope", text("ge"))
        .motion("iyope", text("e"))
        .motion("lopert", text("B"))
        .motion("yopert", text("W"))
        .motion("elopert", text("gE"))
        .motion("eyopert", text("E"))
}

/// CamelCaseMotion plugin
pub(super) fn camel_case_motions(builder: VocabularyBuilder) -> VocabularyBuilder {
    builder
        .motion("calalope", text(",b"))
        .motion("calayope", text(",w"))
        .motion("end calayope", text(",e"))
        .motion("inner calalope", text("i,b"))
        .motion("inner calayope", text("i,w"))
        .motion("inner end calayope", text("i,e"))
}

/// EasyMotion: the leader pressed twice, then the motion key
pub(super) fn easymotion(builder: VocabularyBuilder, leader: &str) -> VocabularyBuilder {
    let motions = [
        ("lope", "b"),
        ("yope", "w"),
        ("elope", "g, e"),
        ("iyope", "e"),
        ("lopert", "B"),
        ("yopert", "W"),
        ("elopert", "g, E"),
        ("eyopert", "E"),
    ];
    motions.iter().fold(builder, |builder, (spoken, key)| {
        builder.motion(
            &format!("easy {}", spoken),
            keys(&format!("{}:2, {}", leader, key)),
        )
    })
}

/// `inner|outer` word and WORD objects
pub(super) fn text_objects(builder: VocabularyBuilder) -> VocabularyBuilder {
    let objects = [("(lope | yope)", "w"), ("(lopert | yopert)", "W")];
    let modifiers = [("inner", "i"), ("outer", "a")];
    let mut builder = builder;
    for (spoken_object, object) in objects {
        for (spoken_modifier, modifier) in modifiers {
            builder = builder.motion(
                &format!("{} {}", spoken_modifier, spoken_object),
                text(&format!("{}{}", modifier, object)),
            );
        }
    }
    builder
}

pub(super) fn letter_motions(builder: VocabularyBuilder) -> VocabularyBuilder {
    builder
        .parameter_motion("phytic", 'f')
        .parameter_motion("fitton", 'F')
        .parameter_motion("pre phytic", 't')
        .parameter_motion("pre fitton", 'T')
}

pub(super) fn ex_commands(builder: VocabularyBuilder) -> VocabularyBuilder {
    builder
        .ex_command("read", text("r "))
        .ex_command("(write | save) file", text("w "))
        .ex_command("quit", text("q "))
        .ex_command("turbo quit", text("q! "))
        .ex_command("write and quit", text("wq "))
        .ex_command("edit", text("e "))
        .ex_command("tab edit", text("tabe "))
        .ex_command("set number", text("set number "))
        .ex_command("set relative number", text("set relativenumber "))
        .ex_command("set ignore case", text("set ignorecase "))
        .ex_command("set no ignore case", text("set noignorecase "))
        .ex_command("set file format unix", text("set fileformat=unix "))
        .ex_command("set file format dos", text("set fileformat=dos "))
        .ex_command("set file type python", text("set filetype=python"))
        .ex_command("set file type tex", text("set filetype=tex"))
        .ex_command("P. W. D.", text("pwd "))
        .ex_command("help", text("help"))
        .ex_command("substitute", text("s/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::vocabulary::{CommandEntry, Variant};

    #[test]
    fn test_builtin_vim_vocabulary_builds() {
        let vocab = Variant::Vim.builder(&VariantOptions::default()).build().unwrap();
        assert_eq!(vocab.name(), "vim");
        assert_eq!(vocab.chaos_operator(), Some("chaos"));
        assert_eq!(vocab.run_exit(), Some(&Action::keys("escape:2").unwrap()));
        assert_eq!(vocab.command("ripple"), Some(&CommandEntry::Macro));
        assert_eq!(vocab.motion("inner yope"), Some(&Action::text("iw")));
        assert_eq!(vocab.motion("outer lopert"), Some(&Action::text("aW")));
        assert_eq!(vocab.uncounted_motion("tect"), Some(&Action::text("%")));
        assert_eq!(vocab.parameter_motion("pre fitton"), Some('T'));
        assert_eq!(vocab.style("brooding narrative"), Some("broodingnarrative"));
        assert!(vocab.ex_command("save file").is_some());
        assert!(vocab.ex_command("left").map(|e| e.counted).unwrap_or(false));
    }

    #[test]
    fn test_easymotion_leader_is_configurable() {
        let options = VariantOptions {
            easymotion_leader: "backslash".to_string(),
        };
        let vocab = builder(&options).build().unwrap();
        assert_eq!(
            vocab.motion("easy yope").map(|a| a.to_string()),
            Some("<backslash:2><w>".to_string())
        );
    }
}
