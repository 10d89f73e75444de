// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub struct SqlBuilder {
    /// The SQL being built
    sql: String,
    /// Number of spaces per indentation level
    indent_spaces: usize,
}

impl SqlBuilder {
    pub fn new(indent_spaces: usize) -> Self {
        Self {
            sql: String::new(),
            indent_spaces,
        }
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push a newline unless the SQL built so far is empty or already ends with one.
    pub fn end_line(&mut self) {
        if !self.sql.is_empty() && !self.sql.ends_with('\n') {
            self.sql.push('\n');
        }
    }

    /// Push elements of an iterator, separated by `sep`.
    pub fn push_iter<T, E>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T) -> Result<(), E>,
    ) -> Result<(), E> {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item)?;

            if i < len - 1 {
                self.sql.push_str(sep);
            }
        }
        Ok(())
    }

    /// Push whatever `func` builds, indented one level. Empty lines are left unindented.
    pub fn push_indented<E>(
        &mut self,
        func: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut inner = SqlBuilder::new(self.indent_spaces);
        func(&mut inner)?;
        self.sql
            .push_str(&indent_lines(&inner.sql, self.indent_spaces));
        Ok(())
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

pub fn indent_lines(text: &str, spaces: usize) -> String {
    let indentation = " ".repeat(spaces);

    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indentation}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indentation() {
        assert_eq!(indent_lines("a\n\n  b\n", 2), "  a\n\n    b\n");
    }

    #[test]
    fn nested_building() {
        let mut builder = SqlBuilder::new(2);
        builder.push_str("select\n");
        builder
            .push_indented(|b| {
                b.push_iter(["a", "b"].into_iter(), ",\n", |b, col| {
                    b.push_str(col);
                    Ok::<_, ()>(())
                })
            })
            .unwrap();
        builder.end_line();
        builder.end_line();
        builder.push_str("from t");

        assert_eq!(builder.into_sql(), "select\n  a,\n  b\nfrom t");
    }
}
