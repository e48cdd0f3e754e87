/// Declares a group of related options. `args!(Name { .. })` creates two structs:
///
/// - `NameCli`: a `clap::Args` to `#[command(flatten)]` into a binary's parser.
/// - `NameArgs`: a plain value with public fields, a `Default` using the same defaults as
///   the CLI, and one builder setter per field. This is what library code takes.
///
/// Fields are written as `"help" name: Type = default;`, and whole other groups can be
/// nested with `name: Group;`.
#[macro_export]
macro_rules! args {
    ($(#$argsmeta:tt)* $name:ident {
        $($fhelp:literal $fname:ident: $ftype:ty = $fdefault:expr;)*
        $($mname:ident: $mtype:ident;)*
    }) => {
        $crate::bin_common::args::args_helper::paste! {
            #[derive(clap::Args, Debug)]
            pub struct [<$name Cli>] {
                $(
                    #[arg(long, default_value_t = ($fdefault), help = $fhelp)]
                    pub $fname: $ftype,
                )*

                $(
                    #[command(flatten)]
                    pub $mname: [<$mtype Cli>],
                )*
            }

            $(#$argsmeta)*
            pub struct [<$name Args>] {
                $(
                    pub $fname: $ftype,
                )*

                $(
                    pub $mname: [<$mtype Args>],
                )*
            }

            impl std::default::Default for [<$name Args>] {
                fn default() -> Self {
                    Self {
                        $(
                            $fname: $fdefault,
                        )*

                        $(
                            $mname: [<$mtype Args>]::default(),
                        )*
                    }
                }
            }

            impl [<$name Args>] {
                $(
                    pub fn $fname(mut self, $fname: $ftype) -> Self {
                        self.$fname = $fname;
                        self
                    }
                )*

                $(
                    pub fn $mname(mut self, $mname: [<$mtype Args>]) -> Self {
                        self.$mname = $mname;
                        self
                    }
                )*
            }

            impl [<$name Cli>] {
                pub fn to_args(&self) -> [<$name Args>] {
                    [<$name Args>] {
                        $(
                            $fname: self.$fname.clone(),
                        )*

                        $(
                            $mname: self.$mname.to_args(),
                        )*
                    }
                }
            }
        }
    };
}

pub use args;
pub use paste::paste;

#[cfg(test)]
mod test {
    use std::num::NonZeroU32;

    use clap::Parser;

    args! {
        #[derive(Clone, Debug, PartialEq)]
        Inner {
            "How many"
            amount: NonZeroU32 = NonZeroU32::new(5).unwrap();
        }
    }

    args! {
        #[derive(Clone, Debug, PartialEq)]
        Outer {
            "A name"
            name: String = "frame".to_string();

            inner: Inner;
        }
    }

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        outer: OuterCli,
    }

    #[test]
    fn defaults_agree() {
        let cli = Cli::try_parse_from(["test"]).unwrap();
        assert_eq!(OuterArgs::default(), cli.outer.to_args());
    }

    #[test]
    fn flags_override() {
        let cli = Cli::try_parse_from(["test", "--name", "other", "--amount", "2"]).unwrap();
        let expected = OuterArgs::default()
            .name("other".to_string())
            .inner(InnerArgs::default().amount(NonZeroU32::new(2).unwrap()));
        assert_eq!(expected, cli.outer.to_args());
    }
}
