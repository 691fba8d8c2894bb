check! {
  concatenation_and_repetition,
  r#"
    print [1,2] + [3,4]
    print [1,2] * 2
  "#,
  "[1,2,3,4]\n[1,2,1,2]\n"
}

check! {
  literal_elements_are_copies,
  r#"
    list a = [1]
    list pair = [a, a]
    pair[0].append(2)
    print a, pair
  "#,
  "[1] [[1,2],[1]]\n"
}

check! {
  subscript_assignment_writes_through,
  r#"
    list l = [1, 2, 3]
    l[1] = 9
    l[-1] = 8
    print l
  "#,
  "[1,9,8]\n"
}

check! {
  nested_subscripts,
  r#"
    list grid = [[1, 2], [3, 4]]
    grid[1][0] = 9
    print grid[1], grid[1][0]
  "#,
  "[9,4] 9\n"
}

check! {
  methods_in_concert,
  r#"
    list l = [1, 3]
    l.insert(1, 2)
    print l
    l.append(4)
    print l
    print l.remove(0)
    print l
    print l.remove(99)
    print l.remove(-1)
    print l
  "#,
  "[1,2,3]\n[1,2,3,4]\n1\n[2,3,4]\nnone\n4\n[2,3]\n"
}

check! {
  insert_clamps,
  r#"
    list l = [2]
    l.insert(-100, 1)
    l.insert(100, 3)
    print l
  "#,
  "[1,2,3]\n"
}

check! {
  append_returns_none,
  r#"
    list l
    print type(l.append(1))
    print l
  "#,
  "none\n[1]\n"
}

check! {
  slicing_copies_deeply,
  r#"
    list l = [[1], [2]]
    list copy = l[:]
    copy[0].append(9)
    print l
    print copy
  "#,
  "[[1],[2]]\n[[1,9],[2]]\n"
}

check! {
  assignment_copies_deeply,
  r#"
    list a = [[1]]
    list b
    b = a
    b[0].append(2)
    print a, b
  "#,
  "[[1]] [[1,2]]\n"
}

check! {
  heterogeneous_lists,
  r#"
    list l = [1, 'a', "str", 2.5, [1]]
    print l
    print l.len()
  "#,
  "[1,a,str,2.5,[1]]\n5\n"
}

check! {
  membership_is_deep,
  r#"
    print [1,2] in [[1,2], [3]]
    print 2 in [1, 2], 5 in [1, 2]
  "#,
  "1\n1 0\n"
}

check! {
  declaration_default_is_empty,
  r#"
    list l
    print l, l.len()
  "#,
  "[] 0\n"
}

check_error! {
  single_index_out_of_range,
  r#"
    print [1, 2][5]
  "#,
  crate::ErrorKind::Index,
  "out of range"
}

check_error! {
  lists_only_assign_lists,
  r#"
    list l
    l = 5
  "#,
  crate::ErrorKind::Type,
  "cannot assign"
}

check_error! {
  index_must_be_integral,
  r#"
    print [1][0.5]
  "#,
  crate::ErrorKind::Type,
  "index must be an integer"
}
