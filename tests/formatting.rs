//! End-to-end formatting cases
//!
//! Small manifests and their canonical form, through the public `format_source` entry point.

use pupfmt::manifest::config::SplitMode;
use pupfmt::manifest::{format_source, parse_source, Error, ParseError, PupfmtConfig};
use rstest::rstest;

fn fmt(source: &str) -> String {
    format_source(source, &PupfmtConfig::default()).expect("format")
}

#[rstest]
#[case::spacing("include   apache", "include apache\n")]
#[case::several_includes("include a,b", "include a, b\n")]
#[case::assignment("$a=1", "$a = 1\n")]
#[case::append("$a+=[2]", "$a += [2]\n")]
#[case::arithmetic("$a = 1+2*3", "$a = 1 + 2 * 3\n")]
#[case::negation("$a = !$b", "$a = !$b\n")]
#[case::parenthesized("$a = ( $b or $c ) and $d", "$a = ($b or $c) and $d\n")]
#[case::call("notice( 'x' , $y )", "notice('x', $y)\n")]
#[case::bare_call("realize   User['a']", "realize User['a']\n")]
#[case::empty_call("hiera_include('classes')", "hiera_include('classes')\n")]
#[case::comment("#no space", "# no space\n")]
#[case::empty_class("class a{}", "class a {}\n")]
#[case::empty_resource("file{'a':}", "file { 'a': }\n")]
#[case::override_ref("File['/tmp']{mode=>'0644'}", "File['/tmp'] {\n  mode => '0644',\n}\n")]
#[case::collector("User<||>", "User <| |>\n")]
#[case::exported_collector("Sshkey<<| |>>", "Sshkey <<| |>>\n")]
#[case::virtual_resource("@user{'bob':}", "@user { 'bob': }\n")]
#[case::regex_match("if $a =~ /^web/ {}", "if $a =~ /^web/ {}\n")]
fn test_canonical_form(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(fmt(source), expected);
}

#[test]
fn test_attribute_arrows_align_per_title() {
    let source = "file {\n'a': ensure => file, mode => '0644';\n'b': owner => root,\n}";
    assert_eq!(
        fmt(source),
        "file { 'a':\n  ensure => file,\n  mode   => '0644',\n}\n\nfile { 'b':\n  owner => root,\n}\n"
    );
}

#[test]
fn test_nested_hash_alignment() {
    let source = "$h = {'long_key'=>{'a'=>1,'bb'=>2},'k'=>3}";
    assert_eq!(
        fmt(source),
        "$h = {\n  'long_key' => {\n    'a'  => 1,\n    'bb' => 2,\n  },\n  'k'        => 3,\n}\n"
    );
}

#[rstest]
#[case::render(SplitMode::Render)]
#[case::splice(SplitMode::Splice)]
fn test_split_modes_agree(#[case] mode: SplitMode) {
    let mut config = PupfmtConfig::default();
    config.parsing.split_resources = mode;
    let source = "package { 'a': ensure => present; 'b': ensure => absent; }\n";
    assert_eq!(
        format_source(source, &config).expect("format"),
        "package { 'a':\n  ensure => present,\n}\n\npackage { 'b':\n  ensure => absent,\n}\n"
    );
}

#[test]
fn test_splice_produces_sibling_resources() {
    let mut config = PupfmtConfig::default();
    config.parsing.split_resources = SplitMode::Splice;
    let ast = parse_source("file { 'a': ; 'b': ; 'c': }", &config).expect("parse");
    assert_eq!(ast.children(ast.root()).len(), 3);

    let ast = parse_source("file { 'a': ; 'b': ; 'c': }", &PupfmtConfig::default())
        .expect("parse");
    assert_eq!(ast.children(ast.root()).len(), 1);
}

#[test]
fn test_chain_member_is_never_split() {
    let source = "package { 'a': ensure => present; 'b': ensure => absent } -> Service['x']";
    let expected = "package {\n  'a':\n    ensure => present;\n  'b':\n    ensure => absent;\n} -> Service['x']\n";
    assert_eq!(fmt(source), expected);

    let mut config = PupfmtConfig::default();
    config.parsing.split_resources = SplitMode::Splice;
    assert_eq!(format_source(source, &config).expect("format"), expected);
}

#[test]
fn test_blank_lines_collapse() {
    assert_eq!(
        fmt("include a\n\n\n\ninclude b\n"),
        "include a\ninclude b\n"
    );
    assert_eq!(
        fmt("class a {\n\n\n  include b\n\n\n}\n\n\n\nclass c {}\n"),
        "class a {\n  include b\n}\n\nclass c {}\n"
    );
}

#[test]
fn test_else_chain() {
    let source = "if $a { include x }\nelsif $b { include y }\nelse { include z }";
    assert_eq!(
        fmt(source),
        "if $a {\n  include x\n} elsif $b {\n  include y\n} else {\n  include z\n}\n"
    );
}

#[test]
fn test_define_with_typed_parameters() {
    let source = "define app::instance(String $port, Optional[Integer] $workers = 4) { }";
    assert_eq!(
        fmt(source),
        "define app::instance(String $port, Optional[Integer] $workers = 4) {}\n"
    );
}

#[test]
fn test_parameter_comments_force_expansion() {
    let source = "class a (\n  # the port\n  $port = 80,\n) {}";
    assert_eq!(
        fmt(source),
        "class a (\n  # the port\n  $port = 80,\n) {}\n"
    );
}

#[test]
fn test_parse_error_names_line_and_token() {
    let err = format_source("class a {\n  file { 'x':\n    ensure => => present\n  }\n}\n", &PupfmtConfig::default())
        .expect_err("bad arrow");
    assert!(matches!(
        err,
        Error::Parse(ParseError::UnexpectedToken { line: 3, .. })
    ));
    assert_eq!(err.to_string(), "line 3: unexpected token '=>'");
}

#[test]
fn test_unterminated_block_reports_eof() {
    let err = format_source("node default {\n  include a\n", &PupfmtConfig::default())
        .expect_err("unterminated");
    assert_eq!(err.to_string(), "unexpected end of input");
}

#[test]
fn test_lex_error_shows_context() {
    let err = format_source("$a = 1\n$b = `x`\n", &PupfmtConfig::default()).expect_err("lex");
    let message = err.to_string();
    assert!(message.starts_with("line 2: unrecognized input"), "{}", message);
    assert!(message.contains(">>"), "{}", message);
}
