#[cfg(test)]
pub const FRONTMATTER_POST: &str = r#"---
title: "What I learned after 20+ years: a list"
date: 2022-04-02
tags: [career, software, career]
description: Advice, mostly
---
How to be a great software engineer?

Someone asked me this question today and I didn’t have an answer. After thinking for a while, I came up with a list of what I try to do myself.

<!-- more -->

## Non technical
"#;

#[cfg(test)]
pub const BLOCK_LIST_POST: &str = "---
tags:
  - rust
  - tools
author: thiago
empty:
---
Body
";

#[cfg(test)]
pub const HEADING_POST: &str = "# My Title

Some text";

#[cfg(test)]
pub const COMPLETE_POST: &str = "---
title: How to write a Code Review
date: 2020-05-22
author: thiago
tags: [review, career]
slug: how-to-write-a-code-review
published: true
---
There is always those quite obvious things such as don't be a jerk.
";

#[cfg(test)]
pub fn test_defaults() -> crate::config::Defaults {
    crate::config::Defaults {
        author: "thiago".to_string(),
        tags: vec!["general".to_string()],
        category: "Uncategorized".to_string(),
        placeholder_names: vec!["untitled".to_string()],
        excerpt_length: 150,
    }
}
