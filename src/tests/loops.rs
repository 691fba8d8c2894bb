check! {
  while_loop_with_break,
  r#"
    int n
    while 1
        n += 1
        if n == 10
            break
    print n
  "#,
  "10\n"
}

check! {
  for_loop_with_continue,
  r#"
    for i in [0, 1, 2, 3]
        if i == 1
            continue
        print i
  "#,
  "0\n2\n3\n"
}

check! {
  while_precheck,
  r#"
    while 0
        print "never"
    print "done"
  "#,
  "done\n"
}

check! {
  do_while_runs_at_least_once,
  r#"
    int n = 100
    do
        print n
    while n < 100
    int m
    do
        m += 1
    while m < 3
    print m
  "#,
  "100\n3\n"
}

check! {
  nested_loops_and_break,
  r#"
    int total
    for i in [1, 2, 3]
        for j in [10, 20, 30]
            if j == 30
                break
            total += j
    print total
  "#,
  "90\n"
}

check! {
  continue_rechecks_the_condition,
  r#"
    int n
    int sum
    while n < 5
        n += 1
        if n == 3
            continue
        sum += n
    print sum
  "#,
  "12\n"
}

check! {
  for_over_an_expression,
  r#"
    int sum
    for x in [1, 2] + [3]
        sum += x
    print sum
  "#,
  "6\n"
}

check! {
  break_inside_do_while,
  r#"
    int n
    do
        n += 1
        if n == 2
            break
    while 1
    print n
  "#,
  "2\n"
}

check! {
  loop_bodies_share_the_enclosing_scope,
  r#"
    int i
    while i < 3
        int x = i * 10
        i += 1
    print x
  "#,
  "20\n"
}

check_error! {
  iterating_a_number_fails,
  r#"
    for i in 5
        pass
  "#,
  crate::ErrorKind::Type,
  "cannot iterate"
}
