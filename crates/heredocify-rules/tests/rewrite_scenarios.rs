//! End-to-end rewrite scenarios
//!
//! Sources are indented the way they appear inside spec files, so base and
//! body indentation are exercised on every case.

use heredocify_core::parse_ruby;
use heredocify_rules::{check, rewrite_source, HeredocStyle, RewriteOptions};

fn rewrite(source: &str) -> String {
    rewrite_source(source, &RewriteOptions::default()).unwrap()
}

fn assert_unchanged(source: &str) {
    assert_eq!(rewrite(source), source);
}

// ==================== Wrapped In A Call ====================

#[test]
fn test_emacs_style_as_argument() {
    let source = r#"      begin
        do_something(['foo',
                      'bar',
                      'baz'])
      end
"#;
    let expected = r#"      begin
        do_something(<<-END.strip_indent)
          foo
          bar
          baz
        END
      end
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_emacs_style_as_argument_with_linefeed() {
    let source = r#"      begin
        do_something(some_arg,
                     ['foo',
                      'bar',
                      'baz'])
      end
"#;
    let expected = r#"      begin
        do_something(some_arg, <<-END.strip_indent)
          foo
          bar
          baz
        END
      end
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_emacs_style_with_join_as_argument() {
    let source = r#"      begin
        do_something(['foo',
                      'bar',
                      'baz'].join(''))
      end
"#;
    let expected = r#"      begin
        do_something(<<-END.strip_indent)
          foo
          bar
          baz
        END
      end
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_consistent_style_as_argument() {
    let source = r#"      begin
        do_something([
          'foo',
          'bar',
          'baz'
        ])
      end
"#;
    let expected = r#"      begin
        do_something(<<-END.strip_indent)
          foo
          bar
          baz
        END
      end
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_consistent_style_as_argument_with_indentation() {
    let source = r#"      begin
        do_something(some_arg, [
                       'foo',
                       'bar',
                       'baz'
                     ])
      end
"#;
    let expected = r#"      begin
        do_something(some_arg, <<-END.strip_indent)
          foo
          bar
          baz
        END
      end
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_consistent_style_with_join_as_argument() {
    let source = r#"      begin
        do_something([
          'foo',
          'bar',
          'baz'
        ].join(''))
      end
"#;
    let expected = r#"      begin
        do_something(<<-END.strip_indent)
          foo
          bar
          baz
        END
      end
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_wrapper_closing_on_later_line() {
    let source = r#"      new_source = autocorrect_source(
        cop,
        ['variable =',
         '  a_long_method_that_dont_fit_on_the_line do |v|',
         '    v.foo',
         'end']
      )
"#;
    let expected = r#"      new_source = autocorrect_source(
        cop,
        <<-END.strip_indent
          variable =
            a_long_method_that_dont_fit_on_the_line do |v|
              v.foo
          end
        END
      )
"#;
    assert_eq!(rewrite(source), expected);
}

// ==================== Standalone Arrays ====================

#[test]
fn test_emacs_style() {
    let source = "      ['foo',\n       'bar',\n       'baz']\n";
    let expected = "      <<-END.strip_indent\n        foo\n        bar\n        baz\n      END\n";
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_emacs_style_with_join() {
    let source = "      ['foo',\n       'bar',\n       'baz'].join('')\n";
    let expected = "      <<-END.strip_indent\n        foo\n        bar\n        baz\n      END\n";
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_consistent_style() {
    let source = "      [\n        'foo',\n        'bar',\n        'baz'\n      ]\n";
    let expected = "      <<-END.strip_indent\n        foo\n        bar\n        baz\n      END\n";
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_dead_interpolation_uses_quoted_marker() {
    let source = r#"      [
        'foo#{obj}bar',
        'foo'
      ]
"#;
    let expected = r#"      <<-'END'.strip_indent
        foo#{obj}bar
        foo
      END
"#;
    assert_eq!(rewrite(source), expected);
}

// ==================== Assertion Chains ====================

#[test]
fn test_multiline_chain() {
    let source = r#"      expect(corrected).to eq(['class Test',
                               '  def self.foo',
                               '    true',
                               '  end',
                               '',
                               '  def self.bar',
                               '    true',
                               '  end',
                               'end']
                               .join("\n"))
"#;
    let expected = r#"      expect(corrected).to eq(<<-END.strip_indent)
        class Test
          def self.foo
            true
          end

          def self.bar
            true
          end
        end
      END
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_indented_source_uses_margin() {
    let source = r#"      expect(corrected).to eq ['  def some_method arg;',
                               '    body',
                               '  end'].join("\n")
"#;
    let expected = r#"      expect(corrected).to eq <<-END.strip_margin('|')
        |  def some_method arg;
        |    body
        |  end
      END
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_trailing_linefeed_is_folded() {
    let source = r#"      expect($stdout.string)
        .to eq(['== example.rb ==',
                '',
                '1 file inspected, 1 offense detected',
                ''].join("\n"))
"#;
    let expected = r#"      expect($stdout.string)
        .to eq(<<-END.strip_indent)
          == example.rb ==

          1 file inspected, 1 offense detected
        END
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_double_quoted_escapes_are_kept() {
    let source = r#"      source = ['  render_views',
                "    describe 'GET index' do",
                "\t    it 'returns http success' do",
                "\t    end",
                "\tdescribe 'admin user' do",
                '     before(:each) do',
                "\t    end",
                "\tend",
                '    end',
                '']
"#;
    let expected = r#"      source = <<-END.strip_indent
          render_views
            describe 'GET index' do
        \t    it 'returns http success' do
        \t    end
        \tdescribe 'admin user' do
             before(:each) do
        \t    end
        \tend
            end
      END
"#;
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_relocated_trailing_call() {
    let source = "      expect(cli.run(['a.rb',\n                      'b.rb'])).to eq(0)\n";
    let expected = "      expect(cli.run(<<-END.strip_indent)).to eq(0)\n        a.rb\n        b.rb\n      END\n";
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_indexed_array_keeps_index_on_opener() {
    let source = "      first = ['a.rb',\n               'b.rb'][0]\n";
    let expected = "      first = <<-END.strip_indent[0]\n        a.rb\n        b.rb\n      END\n";
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_space_after_opening_bracket() {
    let source = "      x = [ 'a',\n            'b']\n";
    let expected = "      x = <<-END.strip_indent\n        a\n        b\n      END\n";
    assert_eq!(rewrite(source), expected);
}

#[test]
fn test_tab_indented_block_array() {
    let source = "      x = [\n\t'a',\n\t'b'\n      ]\n";
    let expected = "      x = <<-END.strip_indent\n        a\n        b\n      END\n";
    assert_eq!(rewrite(source), expected);
}

// ==================== Left Alone ====================

#[test]
fn test_option_array_is_unchanged() {
    assert_unchanged(
        r#"      expect(cli.run(['--format',
                      'emacs',
                      '--debug',
                      'example1.rb'])).to eq(1)
"#,
    );
}

#[test]
fn test_part_of_parent_array_is_unchanged() {
    assert_unchanged(
        r#"      [
        ['ordinary method chain', 'x.foo.bar.baz'],
        ['method chain with safe navigation only with argument',
         'x&.foo(x)&.bar(y)&.baz(z)'],
        ['safe navigation with `try` method', 'a&.b.try(:c)']
      ]
"#,
    );
}

#[test]
fn test_message_assertion_is_unchanged() {
    assert_unchanged(
        r#"      expect(cop.messages)
        .to eq(['Unnecessary disabling of `Metrics/MethodLength`.',
                'Unnecessary disabling of `Lint/Debugger`.',
                'Unnecessary disabling of `Lint/AmbiguousOperator`.'])
"#,
    );
}

#[test]
fn test_trailing_whitespace_is_unchanged() {
    assert_unchanged(
        r#"      expect(corrected).to eq ['  def some_method arg; ',
                               '    body ',
                               '  end'].join("\n")
"#,
    );
}

#[test]
fn test_trailing_escape_is_unchanged() {
    assert_unchanged(
        r##"      corrected = ["puts 'foo' \\",
                   '     "#{bar}"',
                   "puts 'a' \\",
                   "     'b'",
                   'c.to_s',
                   '']
"##,
    );
}

#[test]
fn test_block_chain_is_unchanged() {
    assert_unchanged("      ['a',\n       'b'].each do |line|\n        puts line\n      end\n");
}

#[test]
fn test_comment_between_elements_is_unchanged() {
    assert_unchanged("      x = ['a', # first\n           'b']\n");
}

// ==================== Basic Scenarios ====================

#[test]
fn test_scenario_single_call_argument() {
    let source = "do_something(['foo',\n              'bar',\n              'baz'])\n";
    assert_eq!(
        rewrite(source),
        "do_something(<<-END.strip_indent)\n  foo\n  bar\n  baz\nEND\n"
    );
}

#[test]
fn test_scenario_option_array() {
    assert_unchanged("run(['--format',\n     'emacs',\n     'file.rb'])\n");
}

#[test]
fn test_scenario_join_folding() {
    let source = "['foo',\n 'bar'].join('')\n";
    assert_eq!(rewrite(source), "<<-END.strip_indent\n  foo\n  bar\nEND\n");
}

#[test]
fn test_scenario_trailing_space() {
    assert_unchanged("x = ['foo ',\n     'bar']\n");
}

#[test]
fn test_scenario_nested_block_array() {
    assert_unchanged("[\n  [\n    'a',\n    'b'\n  ]\n]\n");
}

#[test]
fn test_scenario_margin_mode() {
    let source = "x = ['  def foo',\n     '    body',\n     '  end']\n";
    assert_eq!(
        rewrite(source),
        "x = <<-END.strip_margin('|')\n  |  def foo\n  |    body\n  |  end\nEND\n"
    );
}

// ==================== Options ====================

#[test]
fn test_squiggly_heredoc() {
    let options = RewriteOptions {
        heredoc: HeredocStyle::Squiggly,
        ..Default::default()
    };
    let source = "x = ['foo',\n     'bar']\n";
    let result = rewrite_source(source, &options).unwrap();
    assert_eq!(result, "x = <<~END\n  foo\n  bar\nEND\n");
}

#[test]
fn test_marker_avoids_body_lines() {
    let source = "x = ['foo',\n     'END']\n";
    assert_eq!(rewrite(source), "x = <<-SOURCE.strip_indent\n  foo\n  END\nSOURCE\n");
}

#[test]
fn test_no_sound_marker_is_unchanged() {
    let options = RewriteOptions {
        markers: vec!["END".to_string()],
        ..Default::default()
    };
    let source = "x = ['foo',\n     'END']\n";
    assert_eq!(rewrite_source(source, &options).unwrap(), source);
}

#[test]
fn test_custom_indent_width() {
    let options = RewriteOptions {
        indent_width: 4,
        ..Default::default()
    };
    let source = "x = ['foo',\n     'bar']\n";
    let result = rewrite_source(source, &options).unwrap();
    assert_eq!(result, "x = <<-END.strip_indent\n    foo\n    bar\nEND\n");
}

// ==================== Invariants ====================

/// Sources the rewriter changes, with the strings their arrays held
fn rewritten_cases() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "      do_something(['foo',\n                    'bar'])\n",
            vec!["foo", "bar"],
        ),
        (
            "      x = [\n        'a',\n        '',\n        'b',\n        ''\n      ]\n",
            vec!["a", "", "b", ""],
        ),
        (
            "      expect(x).to eq ['  one',\n                       '    two'].join(\"\\n\")\n",
            vec!["  one", "    two"],
        ),
        (
            "      x = ['  deep',\n           'shallow']\n",
            vec!["  deep", "shallow"],
        ),
        (
            "      x = [ 'a',\n            'b']\n",
            vec!["a", "b"],
        ),
        (
            "      x = [\n\t'a',\n\t'  b'\n      ]\n",
            vec!["a", "  b"],
        ),
    ]
}

/// Body lines of the first heredoc terminated by `marker`, with indentation
/// or margin stripped the way the opener asks for
fn heredoc_value(output: &str, marker: &str) -> Vec<String> {
    let lines: Vec<&str> = output.lines().collect();
    let opener = lines.iter().position(|line| line.contains("<<")).unwrap();
    let margin = lines[opener].contains("strip_margin");
    let body: Vec<&str> = lines[opener + 1..]
        .iter()
        .take_while(|line| line.trim() != marker)
        .copied()
        .collect();

    if margin {
        return body
            .iter()
            .map(|line| {
                let trimmed = line.trim_start();
                trimmed.strip_prefix('|').unwrap_or(trimmed).to_string()
            })
            .collect();
    }

    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|line| line.get(indent..).unwrap_or("").to_string())
        .collect()
}

#[test]
fn test_round_trip_preserves_elements() {
    for (source, elements) in rewritten_cases() {
        let output = rewrite(source);
        let mut expected: Vec<String> = elements.iter().map(|s| s.to_string()).collect();
        if expected.last().is_some_and(|last| last.is_empty()) {
            expected.pop();
        }
        assert_eq!(heredoc_value(&output, "END"), expected, "source: {source:?}");
    }
}

#[test]
fn test_rewritten_output_still_parses() {
    for (source, _) in rewritten_cases() {
        let output = rewrite(source);
        assert!(parse_ruby(&output).is_ok(), "unparseable output: {output:?}");
    }
}

#[test]
fn test_rewrite_is_idempotent() {
    for (source, _) in rewritten_cases() {
        let once = rewrite(source);
        assert_ne!(once, source);
        assert_eq!(rewrite(&once), once);
    }
}

#[test]
fn test_edits_never_overlap() {
    let source = r#"      a = ['x',
           'y'].join('')
      foo(bar, ['p',
                'q'])
      b = [
        ['m',
         'n'],
        'o'
      ]
"#;
    let tree = parse_ruby(source).unwrap();
    let edits = check(&tree, &RewriteOptions::default()).unwrap();
    assert!(!edits.is_empty());

    let mut spans: Vec<_> = edits.iter().map(|edit| edit.span).collect();
    spans.sort();
    for pair in spans.windows(2) {
        assert!(!pair[0].intersects(pair[1]), "{} overlaps {}", pair[0], pair[1]);
    }
}

#[test]
fn test_marker_is_sound() {
    let source = "x = ['END',\n     ' SOURCE',\n     'RUBY ok']\n";
    let output = rewrite(source);
    assert!(output.starts_with("x = <<-RUBY.strip_indent\n"));
    assert!(output
        .lines()
        .skip(1)
        .take(3)
        .all(|line| line.trim() != "RUBY"));
}
