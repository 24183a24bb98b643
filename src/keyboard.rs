use rand::Rng;

/// QWERTY neighbours of a key, used to synthesize a plausible slip of the finger.
///
/// Letters map to their physical neighbours (including the number row and punctuation
/// where they touch), and space maps to the bottom row it sits under.
pub fn adjacent_keys(c: char) -> Option<&'static [char]> {
    let neighbors: &'static [char] = match c.to_ascii_lowercase() {
        'a' => &['q', 'w', 's', 'z', 'x'],
        'b' => &['v', 'g', 'h', 'n', ' '],
        'c' => &['x', 'd', 'f', 'v', ' '],
        'd' => &['s', 'e', 'r', 'f', 'c', 'x'],
        'e' => &['w', 's', 'd', 'r', 'f'],
        'f' => &['d', 'r', 't', 'g', 'v', 'c'],
        'g' => &['f', 't', 'y', 'h', 'b', 'v'],
        'h' => &['g', 'y', 'u', 'j', 'n', 'b'],
        'i' => &['u', 'j', 'k', 'o', 'l'],
        'j' => &['h', 'u', 'i', 'k', 'm', 'n'],
        'k' => &['j', 'i', 'o', 'l', ',', 'm'],
        'l' => &['k', 'o', 'p', ';', '.', ','],
        'm' => &['n', 'j', 'k', ',', '.'],
        'n' => &['b', 'h', 'j', 'm', ' '],
        'o' => &['i', 'k', 'l', 'p', ';'],
        'p' => &['o', 'l', ';', '[', ']'],
        'q' => &['1', '2', 'w', 'a', 's'],
        'r' => &['e', 'd', 'f', 't', '4', '5'],
        's' => &['a', 'w', 'e', 'd', 'x', 'z'],
        't' => &['r', 'f', 'g', 'y', '5', '6'],
        'u' => &['y', 'h', 'j', 'i', '7', '8'],
        'v' => &['c', 'f', 'g', 'b', ' '],
        'w' => &['q', '2', '3', 'e', 's', 'a'],
        'x' => &['z', 's', 'd', 'c', ' '],
        'y' => &['t', 'g', 'h', 'u', '6', '7'],
        'z' => &['1', 'a', 's', 'x', ' '],
        ' ' => &['c', 'v', 'b', 'n', 'm', 'x', 'z'],
        _ => return None,
    };
    Some(neighbors)
}

/// A random neighbour of `c`, keeping the case of uppercase letters.
pub fn qwerty_adjacent_char(c: char, rng: &mut impl Rng) -> Option<char> {
    let neighbors = adjacent_keys(c)?;
    let chosen = neighbors[rng.gen_range(0..neighbors.len())];
    Some(if c.is_ascii_uppercase() {
        chosen.to_ascii_uppercase()
    } else {
        chosen
    })
}

/// The key actually hit when aiming for `c`. Characters without a mapping come back as-is.
pub fn mistype(c: char, rng: &mut impl Rng) -> char {
    qwerty_adjacent_char(c, rng).unwrap_or(c)
}
