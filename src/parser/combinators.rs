//! Backtracking parser combinators.
//!
//! A parser maps an input slice to every (result, remaining-input) pair it
//! can derive; an empty vector is failure. `choice` unions alternatives and
//! therefore surfaces genuine grammar ambiguity; `biased_choice` commits to
//! the first alternative that succeeds and is used everywhere ambiguity is
//! not intended. Whitespace is skipped by the lexical combinators (`token`,
//! `lexeme`), not between arbitrary parsers.

use std::rc::Rc;

pub struct Parser<'s, A> {
    run: Rc<dyn Fn(&'s str) -> Vec<(A, &'s str)> + 's>,
}

impl<'s, A> Clone for Parser<'s, A> {
    fn clone(&self) -> Self {
        Parser {
            run: Rc::clone(&self.run),
        }
    }
}

impl<'s, A: 's> Parser<'s, A> {
    pub fn new(run: impl Fn(&'s str) -> Vec<(A, &'s str)> + 's) -> Self {
        Parser { run: Rc::new(run) }
    }

    /// Run the parser, producing every derivation.
    pub fn parse(&self, input: &'s str) -> Vec<(A, &'s str)> {
        (self.run)(input)
    }

    pub fn map<B: 's>(&self, f: impl Fn(A) -> B + 's) -> Parser<'s, B> {
        let run = Rc::clone(&self.run);
        Parser::new(move |input| {
            run(input)
                .into_iter()
                .map(|(a, rest)| (f(a), rest))
                .collect()
        })
    }

    pub fn bind<B: 's>(&self, f: impl Fn(A) -> Parser<'s, B> + 's) -> Parser<'s, B> {
        let run = Rc::clone(&self.run);
        Parser::new(move |input| {
            run(input)
                .into_iter()
                .flat_map(|(a, rest)| f(a).parse(rest))
                .collect()
        })
    }
}

impl<'s, A: Clone + 's> Parser<'s, A> {
    /// Sequence two parsers, pairing their results.
    pub fn and<B: 's>(&self, other: Parser<'s, B>) -> Parser<'s, (A, B)> {
        self.bind(move |a| other.map(move |b| (a.clone(), b)))
    }
}

/// Succeed with `a`, consuming nothing.
pub fn pure<'s, A: Clone + 's>(a: A) -> Parser<'s, A> {
    Parser::new(move |input| vec![(a.clone(), input)])
}

/// Always fail.
pub fn fail<'s, A: 's>() -> Parser<'s, A> {
    Parser::new(|_| Vec::new())
}

/// Defer construction of a parser until it runs, for recursive grammars.
pub fn lazy<'s, A: 's>(f: impl Fn() -> Parser<'s, A> + 's) -> Parser<'s, A> {
    Parser::new(move |input| f().parse(input))
}

/// True alternation: every derivation of every alternative.
pub fn choice<'s, A: 's>(parsers: Vec<Parser<'s, A>>) -> Parser<'s, A> {
    Parser::new(move |input| parsers.iter().flat_map(|p| p.parse(input)).collect())
}

/// Ordered alternation: the derivations of the first alternative that
/// succeeds at all; the rest are never tried.
pub fn biased_choice<'s, A: 's>(parsers: Vec<Parser<'s, A>>) -> Parser<'s, A> {
    Parser::new(move |input| {
        for p in &parsers {
            let results = p.parse(input);
            if !results.is_empty() {
                return results;
            }
        }
        Vec::new()
    })
}

pub fn many<'s, A: Clone + 's>(p: Parser<'s, A>) -> Parser<'s, Vec<A>> {
    let p1 = p.clone();
    biased_choice(vec![lazy(move || many1(p1.clone())), pure(Vec::new())])
}

pub fn many1<'s, A: Clone + 's>(p: Parser<'s, A>) -> Parser<'s, Vec<A>> {
    let p1 = p.clone();
    p.bind(move |first| {
        let first = first.clone();
        many(p1.clone()).map(move |mut rest| {
            let mut all = vec![first.clone()];
            all.append(&mut rest);
            all
        })
    })
}

pub fn sep_by<'s, A, B>(p: Parser<'s, A>, sep: Parser<'s, B>) -> Parser<'s, Vec<A>>
where
    A: Clone + 's,
    B: Clone + 's,
{
    biased_choice(vec![sep_by1(p, sep), pure(Vec::new())])
}

pub fn sep_by1<'s, A, B>(p: Parser<'s, A>, sep: Parser<'s, B>) -> Parser<'s, Vec<A>>
where
    A: Clone + 's,
    B: Clone + 's,
{
    let p1 = p.clone();
    let tail = many(sep.bind(move |_| p1.clone()));
    p.bind(move |first| {
        let first = first.clone();
        tail.clone().map(move |mut rest| {
            let mut all = vec![first.clone()];
            all.append(&mut rest);
            all
        })
    })
}

/// At most one occurrence.
pub fn optional<'s, A: Clone + 's>(p: Parser<'s, A>) -> Parser<'s, Option<A>> {
    biased_choice(vec![p.map(Some), pure(None)])
}

/// Skip leading whitespace, then match a literal exactly.
pub fn token<'s>(literal: &'static str) -> Parser<'s, &'s str> {
    Parser::new(move |input| {
        let trimmed = input.trim_start();
        match trimmed.strip_prefix(literal) {
            Some(rest) => vec![(&trimmed[..literal.len()], rest)],
            None => Vec::new(),
        }
    })
}

/// Skip leading whitespace, then consume the prefix accepted by `matcher`
/// (which returns the matched byte length; zero-length matches fail).
pub fn lexeme<'s>(matcher: fn(&str) -> Option<usize>) -> Parser<'s, &'s str> {
    Parser::new(move |input| {
        let trimmed = input.trim_start();
        match matcher(trimmed) {
            Some(len) if len > 0 => vec![(&trimmed[..len], &trimmed[len..])],
            _ => Vec::new(),
        }
    })
}
