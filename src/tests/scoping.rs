check! {
  function_locals_shadow_globals,
  r#"
    int x = 1
    def f()
        int x = 2
        return x
    print f(), x
  "#,
  "2 1\n"
}

check! {
  for_target_survives_its_loop,
  r#"
    for i in [1, 2, 3]
        pass
    print i
  "#,
  "3\n"
}

check! {
  empty_sequence_leaves_the_target_none,
  r#"
    for i in []
        pass
    print type(i), i
  "#,
  "none none\n"
}

check! {
  for_reuses_an_existing_variable,
  r#"
    int i = 99
    for i in [1, 2]
        pass
    print i
  "#,
  "2\n"
}

check! {
  globals_are_visible_from_nested_calls,
  r#"
    int depth
    def inner()
        depth += 1
        return depth
    def outer()
        return inner()
    print outer(), depth
  "#,
  "1 1\n"
}

check_error! {
  function_locals_are_invisible_afterwards,
  r#"
    def f()
        int hidden = 1
        return hidden
    f()
    print hidden
  "#,
  crate::ErrorKind::Name,
  "not declared"
}

check_error! {
  enclosing_function_scopes_are_skipped,
  r#"
    def outer()
        int x = 10
        def inner()
            return x
        return inner()
    print outer()
  "#,
  crate::ErrorKind::Name,
  "not declared"
}

check! {
  parameters_are_local,
  r#"
    int n = 5
    def f(n)
        n = n * 2
        return n
    print f(3), n
  "#,
  "6 5\n"
}
